use anyhow::{Result, anyhow};
use colored::Colorize;
use vetanemia_core::user::role_or_default;
use vetanemia_session::{Access, Route};

use crate::app::App;
use crate::cli::{LoginArgs, OutputFormat};
use crate::output::{print_field, print_json, print_success};

pub async fn login(app: &App, args: &LoginArgs) -> Result<()> {
    if let Access::Redirect(_) = app.access(Route::SignIn)? {
        println!("Already signed in. Run `vetanemia logout` to switch accounts.");
        return Ok(());
    }

    let token = app
        .guest_client()
        .login(args.email.trim(), &args.password)
        .await
        .map_err(|e| anyhow!(e.user_message("Login")))?;
    app.session.begin_session(&token)?;

    let page = app.mount(Route::Dashboard).await?;
    print_success(&format!(
        "Signed in to {} as {}",
        app.server.cyan(),
        page.user.display_name().cyan()
    ));
    Ok(())
}

pub fn logout(app: &App) -> Result<()> {
    let had_token = app.session.has_token()?;
    app.session.invalidate()?;
    if had_token {
        print_success("Signed out");
    } else {
        println!("No session found for profile \"{}\"", app.profile);
    }
    Ok(())
}

pub async fn whoami(app: &App) -> Result<()> {
    let page = app.mount(Route::Profile).await?;
    let user = &page.user;

    if app.format == OutputFormat::Json {
        return print_json(user);
    }
    print_field("Name", format!("{} ({})", user.display_name(), user.initials()));
    print_field("Email", &user.email);
    print_field("Role", role_or_default(Some(user)));
    print_field("Clinic", &user.clinic_id);
    print_field("Server", &app.server);
    print_field("Profile", &app.profile);
    Ok(())
}
