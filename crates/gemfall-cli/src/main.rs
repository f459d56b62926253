mod command;
mod ui;
mod util;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    command::run()
}
