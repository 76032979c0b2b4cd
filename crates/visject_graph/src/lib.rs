// SPDX-License-Identifier: MIT OR Apache-2.0
//! Visject node graph engine.
//!
//! This crate holds everything about a visual-scripting graph that does not
//! need a UI:
//! - Type model and variant values
//! - Node archetypes and instances with typed boxes
//! - Graph contexts with nested sub-graphs and parameters
//! - Connection validation and box type propagation
//! - Binary serialization (current format plus legacy decoders)
//! - Automatic layout and alignment
//!
//! ## Architecture
//!
//! A [`SurfaceContext`] owns its nodes and parameters. Nodes are built by a
//! [`NodeFactory`] from shared [`NodeArchetype`] templates. Connections are
//! stored on both ends and every mutation goes through the context so both
//! ends stay in sync. All graph state is single-threaded; only
//! [`discovery`] runs work in the background.

pub mod archetype;
pub mod archetypes;
pub mod codec;
pub mod connection;
pub mod context;
pub mod discovery;
pub mod element;
pub mod factory;
pub mod layout;
pub mod meta;
pub mod node;
pub mod parameter;
pub mod propagation;
pub mod traversal;
pub mod types;
pub mod variant;

pub use archetype::{node_key, ElementArchetype, ElementKind, GroupArchetype, NodeArchetype, NodeFlags};
pub use codec::{load, save, FormatError};
pub use connection::{Connection, ConnectionError};
pub use context::{ContextError, ContextEvent, SurfaceContext};
pub use element::{BoxDirection, BoxId, BoxRef, SurfaceBox};
pub use factory::NodeFactory;
pub use layout::{LayoutSettings, NodeAlignment, NodeMove, Rect};
pub use meta::{GraphMetadata, SurfaceViewMeta};
pub use node::{NodeId, SurfaceNode};
pub use parameter::SurfaceParameter;
pub use traversal::{CycleError, TraversalDirection};
pub use types::{ConnectionsHint, ScriptType, VariantKind};
pub use variant::Variant;
