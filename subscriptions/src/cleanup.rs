use subscriptions_backend::{
    model::{SubscriptionName, TopicName},
    PubsubService, ServiceResult,
};

/// A resource the service can delete by name.
pub trait Deletable {
    const KIND: &'static str;

    fn delete_from<S: PubsubService + ?Sized>(&self, service: &S) -> ServiceResult<()>;
}

impl Deletable for TopicName {
    const KIND: &'static str = "topic";

    fn delete_from<S: PubsubService + ?Sized>(&self, service: &S) -> ServiceResult<()> {
        service.delete_topic(self)
    }
}

impl Deletable for SubscriptionName {
    const KIND: &'static str = "subscription";

    fn delete_from<S: PubsubService + ?Sized>(&self, service: &S) -> ServiceResult<()> {
        service.delete_subscription(self)
    }
}

/// Owns a resource created during the run and deletes it exactly once.
///
/// [`Provisioned::release`] deletes it and reports the outcome. A guard dropped
/// without being released (because an earlier step failed) deletes on a
/// best-effort basis and only logs failures.
pub struct Provisioned<'a, S: PubsubService + ?Sized, R: Deletable> {
    service: &'a S,
    resource: R,
    armed: bool,
}

impl<'a, S: PubsubService + ?Sized, R: Deletable> Provisioned<'a, S, R> {
    pub fn new(service: &'a S, resource: R) -> Self {
        Self {
            service,
            resource,
            armed: true,
        }
    }

    pub fn name(&self) -> &R {
        &self.resource
    }

    /// Deletes the resource now. A failed delete is not retried when the guard drops.
    pub fn release(mut self) -> ServiceResult<()> {
        self.armed = false;
        self.resource.delete_from(self.service)
    }
}

impl<S: PubsubService + ?Sized, R: Deletable> Drop for Provisioned<'_, S, R> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        log::debug!("Cleaning up {} left behind by a failed run", R::KIND);
        if let Err(err) = self.resource.delete_from(self.service) {
            log::warn!("Could not clean up {}: {err}", R::KIND);
        }
    }
}
