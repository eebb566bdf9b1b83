fn main() -> anyhow::Result<()> {
    bzr_report::cli::main()
}
