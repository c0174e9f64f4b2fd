mod app;
mod error;
mod feed;
mod logging;
mod model;
mod services;
mod theme;
mod ui;
mod widgets;

use anyhow::Result;

fn main() -> Result<()> {
    logging::init_logging()?;
    ui::run()
}
