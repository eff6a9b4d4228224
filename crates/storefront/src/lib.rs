//! AmaStore Storefront - Catalog, cart, and order engine.
//!
//! This crate is the client-side engine behind the AmaStore UI. It holds no
//! data of its own: persistence, authentication, and querying are delegated
//! to a hosted Supabase backend, and the anonymous cart lives in a local
//! snapshot file. The crate's job is shaping query results for views and
//! keeping the cart consistent between the remote store and the local cache.
//!
//! # Architecture
//!
//! - [`supabase`] - Typed client over the hosted PostgREST contract
//! - [`cart`] - Cart state, backing stores, and the sync orchestrator
//! - [`catalog`] - Product browsing (category filter, search, sort)
//! - [`orders`] - Checkout and order history
//! - [`seed`] - Idempotent sample-catalog seeding
//!
//! # Cart consistency
//!
//! The cart has exactly one authoritative store at any instant, chosen by
//! identity: the remote `cart_items` table for a signed-in user, the local
//! snapshot for an anonymous session. [`cart::CartService`] owns that
//! decision; nothing else writes to either store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod models;
pub mod orders;
pub mod seed;
pub mod supabase;

pub use amastore_core::{OrderId, OrderItemId, Price, ProductId, UserId};
