use anyhow::Result;

fn main() -> Result<()> {
    veil_demo::run()
}
