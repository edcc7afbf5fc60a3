//! Type-state markers for the builder pattern
//!
//! They track at compile time whether the URL and the router were provided,
//! so `build()` only exists once both are set.

use crate::config::RouteTable;
use crate::traits::MessageRouter;

/// Marker trait for URL state
pub trait UrlState {}

/// URL has not been set
pub struct NoUrl;
impl UrlState for NoUrl {}

/// URL has been set
pub struct HasUrl;
impl UrlState for HasUrl {}

/// Marker trait for Router state
pub trait RouterState {}

/// Router has not been set
pub struct NoRouter;
impl RouterState for NoRouter {}

/// Router has been set, together with its handler table
pub struct Routed<R>
where
    R: MessageRouter,
{
    pub(crate) router: R,
    pub(crate) routes: RouteTable<R>,
}
impl<R> RouterState for Routed<R> where R: MessageRouter {}
