fn main() -> anyhow::Result<()> {
    xtravault::cli::run()
}
