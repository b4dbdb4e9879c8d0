//! Walks through configuring the Daldalso strategy from a JSON config, sending the user to the
//! consent page, and handling the redirect that comes back.

// crates.io
use color_eyre::Result;
use url::Url;
// self
use oauth2_daldalso::{
	AuthenticateRequest, Authentication, StrategyOptions, auth::TokenSet, profile::Profile,
	strategy::ReqwestStrategy,
};

#[derive(Debug)]
struct Member {
	id: String,
	name: String,
}

async fn find_or_create(
	_tokens: TokenSet,
	profile: Profile,
) -> Result<Option<Member>, std::io::Error> {
	let name = profile.display_name.clone().unwrap_or_else(|| profile.id.clone());

	Ok(Some(Member { id: profile.id, name }))
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let options: StrategyOptions = serde_json::from_str(
		r#"{
			"clientID": "demo-client",
			"clientSecret": "demo-secret",
			"callbackURL": "https://app.example.com/auth/daldalso/callback",
			"scope": ["profile"]
		}"#,
	)?;
	let strategy = ReqwestStrategy::new(options, find_or_create)?;

	println!("Registered strategy `{}`.", strategy.name());

	// Any stable per-browser key works, e.g. the host's session cookie id.
	let session = "demo-session";
	let start = AuthenticateRequest::start().with_session(session);
	let redirect = match strategy.authenticate(start).await? {
		Authentication::Redirect(redirect) => redirect,
		other => return Err(color_eyre::eyre::eyre!("Expected a redirect, got {other:?}.")),
	};

	println!("Send your user to {}.", redirect.url);

	// A callback whose `state` was never issued is refused before the token endpoint is called.
	let forged = Url::parse("https://app.example.com/auth/daldalso/callback?code=x&state=forged")?;

	let callback = AuthenticateRequest::from_callback_url(&forged).with_session(session);

	match strategy.authenticate(callback).await? {
		Authentication::Fail(reason) => println!("Forged callback refused: {reason}"),
		other => println!("Unexpected outcome: {other:?}."),
	}

	println!(
		"On the real callback, pass the redirect URL to `AuthenticateRequest::from_callback_url` \
		with the same session and state `{}`.",
		redirect.state
	);

	Ok(())
}
