fn main() -> anyhow::Result<()> {
    routescout::run()?;
    Ok(())
}
