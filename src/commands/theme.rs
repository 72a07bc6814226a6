use crate::app::App;
use crate::args::ThemeArgs;
use crate::commands::Out;
use crate::model::Theme;
use crate::{Config, Result};

/// Shows the current theme, or changes it with `--toggle` or `--set`. Changes are saved
/// immediately.
pub async fn theme(config: Config, args: ThemeArgs) -> Result<Out<Theme>> {
    let mut app = App::open(&config).await;
    let message = if args.toggle() {
        let theme = app.toggle_theme().await;
        format!("Switched to the {theme} theme")
    } else if let Some(theme) = args.set() {
        app.set_theme(theme).await;
        format!("The theme is now {theme}")
    } else {
        format!("The current theme is {}", app.theme())
    };
    Ok(Out::new(message, app.theme()))
}
