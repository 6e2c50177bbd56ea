//! Sources for a resource's extra secrets.
//!
//! The unlock flow starts from the extras stored on the resource and hands
//! them to an [`ExtrasProvider`], which may keep, replace or rewrite them.
//! Providers compose with [`Chain`], so a configured default can be followed
//! by host-specific override logic.

use crate::config::SiteConfig;
use crate::credentials::extras::ExtrasValue;
use crate::credentials::resource::Resource;

pub trait ExtrasProvider {
    /// Returns the extras to match against. `current` is the value produced by
    /// the previous source in the chain.
    fn extras(&self, resource: &Resource, current: ExtrasValue) -> ExtrasValue;
}

impl<P> ExtrasProvider for &P
where
    P: ExtrasProvider + ?Sized,
{
    fn extras(&self, resource: &Resource, current: ExtrasValue) -> ExtrasValue {
        (**self).extras(resource, current)
    }
}

impl<P> ExtrasProvider for Box<P>
where
    P: ExtrasProvider + ?Sized,
{
    fn extras(&self, resource: &Resource, current: ExtrasValue) -> ExtrasValue {
        (**self).extras(resource, current)
    }
}

/// Keeps whatever extras the resource already carries.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoredExtras;

impl ExtrasProvider for StoredExtras {
    fn extras(&self, _resource: &Resource, current: ExtrasValue) -> ExtrasValue {
        current
    }
}

/// Reads the admin-configured extras for the resource from the site config.
/// Unknown resources have none.
#[derive(Debug, Clone, Copy)]
pub struct ConfiguredExtras<'a> {
    config: &'a SiteConfig,
}

impl<'a> ConfiguredExtras<'a> {
    pub fn new(config: &'a SiteConfig) -> Self {
        Self { config }
    }
}

impl ExtrasProvider for ConfiguredExtras<'_> {
    fn extras(&self, resource: &Resource, _current: ExtrasValue) -> ExtrasValue {
        self.config
            .resource(&resource.id)
            .map(|configured| configured.extras.clone())
            .unwrap_or_default()
    }
}

/// The same extras for every resource.
#[derive(Debug, Clone, Default)]
pub struct StaticExtras(pub ExtrasValue);

impl ExtrasProvider for StaticExtras {
    fn extras(&self, _resource: &Resource, _current: ExtrasValue) -> ExtrasValue {
        self.0.clone()
    }
}

/// Override logic supplied as a closure over the resource and the incoming value.
pub struct FnOverride<F>(pub F);

impl<F> ExtrasProvider for FnOverride<F>
where
    F: Fn(&Resource, ExtrasValue) -> ExtrasValue,
{
    fn extras(&self, resource: &Resource, current: ExtrasValue) -> ExtrasValue {
        (self.0)(resource, current)
    }
}

/// Runs `first`, then feeds its output to `then`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Chain<A, B> {
    first: A,
    then: B,
}

impl<A, B> Chain<A, B> {
    pub fn new(first: A, then: B) -> Self {
        Self { first, then }
    }
}

impl<A, B> ExtrasProvider for Chain<A, B>
where
    A: ExtrasProvider,
    B: ExtrasProvider,
{
    fn extras(&self, resource: &Resource, current: ExtrasValue) -> ExtrasValue {
        let current = self.first.extras(resource, current);
        self.then.extras(resource, current)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::{Chain, ConfiguredExtras, ExtrasProvider, FnOverride, StaticExtras, StoredExtras};
    use crate::config::SiteConfig;
    use crate::credentials::extras::{ExtraSecret, ExtrasValue};
    use crate::credentials::resource::Resource;

    fn resource(id: &str) -> Resource {
        Resource::new(id, Some("primary".into())).with_extras(ExtrasValue::plain(["stored"]))
    }

    #[test]
    fn stored_extras_pass_through() {
        let r = resource("a");
        assert_eq!(StoredExtras.extras(&r, r.extras.clone()).candidates(), vec!["stored"]);
    }

    #[test]
    fn configured_extras_come_from_site_config() {
        let config = SiteConfig::from_json_str(
            r#"{
                "siteUrl": "https://example.test",
                "resources": {
                    "about": { "password": "pw", "extraPasswords": ["one", {"label": "l", "password": "two"}] }
                }
            }"#,
        )
        .expect("config should parse");
        let provider = ConfiguredExtras::new(&config);

        let about = provider.extras(&resource("about"), ExtrasValue::Absent);
        assert_eq!(about.candidates(), vec!["one", "two"]);
        assert_eq!(provider.extras(&resource("missing"), ExtrasValue::plain(["x"])), ExtrasValue::Absent);
    }

    #[test]
    fn override_sees_default_output_once() {
        let calls = Cell::new(0);
        let chain = Chain::new(
            StaticExtras(ExtrasValue::plain(["configured"])),
            FnOverride(|resource: &Resource, current: ExtrasValue| {
                calls.set(calls.get() + 1);
                let mut entries = match current {
                    ExtrasValue::List(entries) => entries,
                    _ => Vec::new(),
                };
                entries.push(ExtraSecret::Plain(format!("{}-guest", resource.id)));
                ExtrasValue::List(entries)
            }),
        );

        let extras = chain.extras(&resource("post"), ExtrasValue::Absent);
        assert_eq!(extras.candidates(), vec!["configured", "post-guest"]);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn override_can_clear_extras() {
        let chain = Chain::new(StoredExtras, FnOverride(|_: &Resource, _: ExtrasValue| ExtrasValue::Absent));
        let r = resource("a");
        assert!(chain.extras(&r, r.extras.clone()).is_empty());
    }

    #[test]
    fn boxed_providers_are_providers() {
        let boxed: Box<dyn ExtrasProvider> = Box::new(StaticExtras(ExtrasValue::plain(["b"])));
        assert_eq!(boxed.extras(&resource("a"), ExtrasValue::Absent).candidates(), vec!["b"]);
    }
}
