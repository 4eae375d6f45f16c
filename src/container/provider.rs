//! Service providers: modular, optionally lazy registration.

use crate::container::Container;
use crate::error::DiResult;

/// A bundle of definitions registered with a [`Container`].
///
/// A provider that lists the keys it [`provides`](ServiceProvider::provides)
/// is registered lazily: its [`register`](ServiceProvider::register) method
/// runs the first time one of those keys is looked up. A provider with an
/// empty list registers immediately.
///
/// [`boot`](ServiceProvider::boot) and
/// [`boot_deferred`](ServiceProvider::boot_deferred) run once, from
/// [`Container::boot_services`]; every provider's `boot` runs before any
/// `boot_deferred`.
///
/// # Example
///
/// ```rust
/// use ferrous_autowire::{Container, DiResult, ServiceProvider, TypeDescriptor, TypeRegistry};
///
/// struct MailProvider;
///
/// impl ServiceProvider for MailProvider {
///     fn name(&self) -> &str {
///         "MailProvider"
///     }
///
///     fn provides(&self) -> Vec<String> {
///         vec!["mailer".to_string()]
///     }
///
///     fn register(&self, container: &Container) -> DiResult<()> {
///         container.define_shared("mailer", "SmtpMailer")
///     }
/// }
///
/// # fn main() -> DiResult<()> {
/// let container = Container::new(TypeRegistry::new().with_type(TypeDescriptor::class("SmtpMailer")));
/// container.register_service_provider(MailProvider)?;
///
/// assert!(!container.has_definition("mailer"));
/// assert!(container.has("mailer")); // registers the provider
/// assert!(container.has_definition("mailer"));
/// # Ok(())
/// # }
/// ```
pub trait ServiceProvider {
    /// Identity used by [`Container::service_provider_exists`].
    fn name(&self) -> &str;

    /// Keys this provider defines; empty means register immediately.
    fn provides(&self) -> Vec<String> {
        Vec::new()
    }

    /// Aliases (`name`, `target`) added when the provider is registered.
    fn aliases(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Runs once when the provider is handed to the container.
    fn init(&self, _container: &Container) -> DiResult<()> {
        Ok(())
    }

    /// Defines the provider's services.
    fn register(&self, container: &Container) -> DiResult<()>;

    fn boot(&self, _container: &Container) -> DiResult<()> {
        Ok(())
    }

    fn boot_deferred(&self, _container: &Container) -> DiResult<()> {
        Ok(())
    }
}
