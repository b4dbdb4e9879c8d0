//! Host verification hook invoked once a profile is loaded.

// self
use crate::{_prelude::*, auth::TokenSet, error::BoxError, profile::Profile};

/// Future returned by [`Verify::verify`].
pub type VerifyFuture<'a, U> =
	Pin<Box<dyn Future<Output = Result<Option<U>, BoxError>> + 'a + Send>>;

/// Host hook that turns a freshly signed-in Daldalso profile into an application user.
///
/// Returning `Ok(None)` rejects the sign-in without raising an error; returning `Err` aborts the
/// attempt with [`Error::Verify`].
///
/// Any `Fn(TokenSet, Profile) -> impl Future<Output = Result<Option<U>, E>>` closure implements
/// the trait.
pub trait Verify
where
	Self: 'static + Send + Sync,
{
	/// Application user produced on success.
	type User: Send;

	/// Resolves the user for `profile`.
	fn verify(&self, tokens: TokenSet, profile: Profile) -> VerifyFuture<'_, Self::User>;
}
impl<F, Fut, U, E> Verify for F
where
	F: 'static + Send + Sync + Fn(TokenSet, Profile) -> Fut,
	Fut: 'static + Send + Future<Output = Result<Option<U>, E>>,
	U: Send,
	E: Into<BoxError>,
{
	type User = U;

	fn verify(&self, tokens: TokenSet, profile: Profile) -> VerifyFuture<'_, Self::User> {
		let fut = (self)(tokens, profile);

		Box::pin(async move { fut.await.map_err(Into::into) })
	}
}
