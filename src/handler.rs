//! Handler trait and type erasure.
//!
//! An [`Api`](crate::Api) holds handlers of *different* concrete types side by
//! side, and compiled dispatch tables share them across every request. We
//! hide each concrete function behind one trait object so they can be stored
//! uniformly:
//!
//! ```text
//! fn quake(req: &Request, reply: &mut Reply) -> Outcome { … }   ← user writes this
//!        ↓ Variant::new(quake)
//! quake.into_boxed_handler()                                    ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(quake))                                    ← stored as BoxedHandler
//!        ↓
//! handler.call(&req, &mut reply)                                ← one vtable dispatch
//! ```
//!
//! Handlers are synchronous and must not keep the reply buffer past the call.

use std::sync::Arc;

use crate::outcome::Outcome;
use crate::reply::Reply;
use crate::request::Request;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` because it appears in the return type of the public
/// `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: &Request, reply: &mut Reply) -> Outcome;
}

/// A type-erased handler shared by every dispatch table that references it.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid application handler.
///
/// You never implement this yourself. It is satisfied by any function or
/// closure with the signature:
///
/// ```text
/// fn name(req: &Request, reply: &mut Reply) -> Outcome
/// ```
///
/// Closures need their argument types spelled out so they are generic over
/// the borrow lifetimes: `|req: &Request, reply: &mut Reply| { … }`.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

// ── Sealing ───────────────────────────────────────────────────────────────────

// `Sealed` is public but lives in a private module, so downstream crates can
// name `Handler` in bounds yet can never implement it. The blanket impl below
// is the only way in, which keeps the handler signature the single contract.
mod private {
    pub trait Sealed {}
}

impl<F> private::Sealed for F where F: Fn(&Request, &mut Reply) -> Outcome + Send + Sync + 'static {}

impl<F> Handler for F
where
    F: Fn(&Request, &mut Reply) -> Outcome + Send + Sync + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Type erasure ──────────────────────────────────────────────────────────────

/// Bridges a concrete handler `F` to the trait-object world.
struct FnHandler<F>(F);

impl<F> ErasedHandler for FnHandler<F>
where
    F: Fn(&Request, &mut Reply) -> Outcome + Send + Sync,
{
    fn call(&self, req: &Request, reply: &mut Reply) -> Outcome {
        // Parenthesised so this calls the field, not a method named `0`.
        (self.0)(req, reply)
    }
}
