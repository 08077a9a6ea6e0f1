use std::io::Write;

use techcal::backend::auth::Authenticator;
use techcal::storage::config::{BackendConfig, Config, BACKEND_KEY_VAR, BACKEND_URL_VAR};

/// Makes sure a usable session exists before the calendar starts, walking
/// the user through sign-in when there is none. Browsing works without an
/// account, so declining is fine.
pub async fn check_or_setup_auth() -> Result<(), Box<dyn std::error::Error>> {
    let backend = match BackendConfig::from_env() {
        Ok(backend) => backend,
        Err(e) => {
            println!("Backend not configured: {}", e);
            println!("\nSet these environment variables:");
            println!("  {} - base URL of the event store", BACKEND_URL_VAR);
            println!("  {} - public API key", BACKEND_KEY_VAR);
            return Err(e.into());
        }
    };

    let config = Config::load_or_create()?;
    let mut auth = Authenticator::new(backend, config.storage.session_cache.clone());

    if let Ok(session) = auth.get_valid_session().await {
        println!("Signed in as {}. Starting calendar...\n", session.display_name());
        return Ok(());
    }

    println!("\n=== techcal sign in ===\n");
    println!("  1. Sign in with email and password");
    println!("  2. Create an account");
    println!("  3. Sign in with Google or GitHub (browser)");
    println!("  4. Forgot password");
    println!("  5. Browse without an account\n");

    match prompt("Choose an option [1-5]: ")?.as_str() {
        "1" => {
            let email = prompt("Email: ")?;
            let password = prompt("Password: ")?;
            let session = auth.sign_in_with_password(&email, &password).await?;
            println!("\nWelcome back, {}!\n", session.display_name());
        }
        "2" => {
            let name = prompt("Full name: ")?;
            let email = prompt("Email: ")?;
            let password = prompt("Password: ")?;
            let session = auth.sign_up(&email, &password, &name).await?;
            println!("\nAccount created. Welcome, {}!\n", session.display_name());
        }
        "3" => {
            let provider = match prompt("Provider (google/github): ")?.as_str() {
                "github" => "github",
                _ => "google",
            };
            println!("\n1. Open this URL in your browser:\n");
            println!("{}\n", auth.oauth_authorize_url(provider));
            println!("2. Sign in and authorize the application");
            println!("3. Copy the access_token and refresh_token from the redirect URL\n");

            let access_token = prompt("access_token: ")?;
            let refresh_token = prompt("refresh_token (optional): ")?;
            let refresh = (!refresh_token.is_empty()).then_some(refresh_token.as_str());
            let session = auth.adopt_tokens(&access_token, refresh).await?;
            println!("\nWelcome, {}!\n", session.display_name());
        }
        "4" => {
            let email = prompt("Email: ")?;
            auth.send_recovery_email(&email).await?;
            println!("\nRecovery email sent. Open the link and copy the access_token from it.\n");
            let token = prompt("access_token (Enter to finish later): ")?;
            if !token.is_empty() {
                let password = prompt("New password: ")?;
                auth.update_password(&token, &password).await?;
                println!("\nPassword updated. Sign in with it from the menu.\n");
            }
        }
        _ => {
            println!("\nBrowsing anonymously. Tracking and the dashboard need an account.\n");
        }
    }

    Ok(())
}

fn prompt(label: &str) -> Result<String, std::io::Error> {
    print!("{}", label);
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}
