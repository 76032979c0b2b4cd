// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node types generated from registered script types.
//!
//! Plugins register [`TypeDescriptor`]s (enums and structures) in a
//! [`TypeRegistry`], each with a closure that turns the descriptor into
//! node archetypes. [`NodeTypeCache`] runs that generation on a background
//! thread so opening a spawn menu never blocks, and hands the finished
//! group back to the owning thread through [`NodeTypeCache::pump`].

use crate::archetype::{ElementArchetype, GroupArchetype, NodeArchetype, NodeFlags};
use crate::factory::NodeFactory;
use crate::types::{ScriptType, VariantKind};
use crate::variant::Variant;
use parking_lot::Mutex;
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Group id used for generated node types
pub const DISCOVERED_GROUP_ID: u16 = 100;

/// Shape of a registered type
#[derive(Debug, Clone, PartialEq)]
pub enum TypeShape {
    /// Named integer constants
    Enum {
        /// `(name, value)` pairs in declaration order
        entries: Vec<(String, u64)>,
    },
    /// Plain data with named fields
    Structure {
        /// `(name, type)` pairs in declaration order
        fields: Vec<(String, ScriptType)>,
    },
}

/// A script type known to the registry
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    /// Fully qualified type name
    pub type_name: String,
    /// Enum entries or structure fields
    pub shape: TypeShape,
}

impl TypeDescriptor {
    /// Describe an enum
    pub fn enumeration(type_name: impl Into<String>, entries: &[(&str, u64)]) -> Self {
        Self {
            type_name: type_name.into(),
            shape: TypeShape::Enum {
                entries: entries.iter().map(|(n, v)| ((*n).to_owned(), *v)).collect(),
            },
        }
    }

    /// Describe a structure
    pub fn structure(type_name: impl Into<String>, fields: &[(&str, ScriptType)]) -> Self {
        Self {
            type_name: type_name.into(),
            shape: TypeShape::Structure {
                fields: fields.iter().map(|(n, t)| ((*n).to_owned(), t.clone())).collect(),
            },
        }
    }

    /// Type descriptor of values of this type
    pub fn script_type(&self) -> ScriptType {
        let kind = match self.shape {
            TypeShape::Enum { .. } => VariantKind::Enum,
            TypeShape::Structure { .. } => VariantKind::Structure,
        };
        ScriptType::named(kind, self.type_name.clone())
    }

    /// Name without its namespace
    pub fn short_name(&self) -> &str {
        self.type_name.rsplit('.').next().unwrap_or(&self.type_name)
    }
}

/// Turns a descriptor into node archetypes; type ids are assigned later
pub type ArchetypeGenerator = Arc<dyn Fn(&TypeDescriptor) -> Vec<NodeArchetype> + Send + Sync>;

/// Pack and unpack nodes for structures, a constant node for enums
pub fn default_archetypes(desc: &TypeDescriptor) -> Vec<NodeArchetype> {
    let ty = desc.script_type();
    let name = desc.short_name();
    match &desc.shape {
        TypeShape::Enum { entries } => {
            let value = entries.first().map_or(0, |(_, v)| *v);
            vec![NodeArchetype::new(0, name, [180.0, 40.0])
                .with_description(format!("Constant {} value", desc.type_name))
                .with_values(vec![Variant::Enum {
                    type_name: Some(desc.type_name.clone()),
                    value,
                }])
                .with_elements(vec![
                    ElementArchetype::output(0.0, "Value", ty, 0),
                    ElementArchetype::enum_value(0.0, 0.0, 140.0, 0),
                ])]
        }
        TypeShape::Structure { fields } => {
            let n = fields.len();
            let height = 40.0 + 20.0 * n as f32;

            let mut pack: Vec<ElementArchetype> = fields
                .iter()
                .enumerate()
                .map(|(i, (field, field_ty))| {
                    ElementArchetype::input_with_value(i as f32, field.as_str(), field_ty.clone(), i as u8, i)
                })
                .collect();
            pack.push(ElementArchetype::output(0.0, name, ty.clone(), n as u8));

            let mut unpack = vec![ElementArchetype::input(0.0, name, true, ty.clone(), 0)];
            unpack.extend(fields.iter().enumerate().map(|(i, (field, field_ty))| {
                ElementArchetype::output(i as f32, field.as_str(), field_ty.clone(), i as u8 + 1)
            }));

            vec![
                NodeArchetype::new(0, format!("Pack {name}"), [200.0, height])
                    .with_description(format!("Builds a {} from its fields", desc.type_name))
                    .with_values(fields.iter().map(|(_, t)| Variant::default_for(t)).collect())
                    .with_elements(pack),
                NodeArchetype::new(0, format!("Unpack {name}"), [200.0, height])
                    .with_description(format!("Breaks a {} into its fields", desc.type_name))
                    .with_values(vec![Variant::default_for(&ty)])
                    .with_elements(unpack),
            ]
        }
    }
}

struct RegisteredType {
    descriptor: TypeDescriptor,
    generator: ArchetypeGenerator,
}

/// Types registered by plugins
#[derive(Default)]
pub struct TypeRegistry {
    types: Vec<RegisteredType>,
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.types.iter().map(|t| &t.descriptor.type_name))
            .finish()
    }
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type with the default archetype generator
    pub fn register(&mut self, descriptor: TypeDescriptor) {
        self.register_with(descriptor, Arc::new(default_archetypes));
    }

    /// Register a type with a custom archetype generator
    pub fn register_with(&mut self, descriptor: TypeDescriptor, generator: ArchetypeGenerator) {
        tracing::debug!("Registered script type {}", descriptor.type_name);
        self.types.push(RegisteredType {
            descriptor,
            generator,
        });
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered descriptors in registration order
    pub fn descriptors(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.iter().map(|t| &t.descriptor)
    }

    /// Generate every archetype into one group, numbering types from 1
    pub fn discover(&self, group_id: u16) -> GroupArchetype {
        let mut group = GroupArchetype::new(group_id, "Script Types", [120, 80, 200]);
        let mut next_type_id: u16 = 1;
        for registered in &self.types {
            for mut archetype in (registered.generator)(&registered.descriptor) {
                if next_type_id == u16::MAX {
                    tracing::warn!("Too many generated node types, skipping {}", archetype.title);
                    continue;
                }
                archetype.type_id = next_type_id;
                archetype.flags |= NodeFlags::ALL_GRAPHS;
                next_type_id += 1;
                group = group.with(archetype);
            }
        }
        group
    }
}

/// Notification posted by the discovery thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryEvent {
    /// A discovery pass stored its group in the cache
    Finished {
        /// Cache generation the pass belongs to
        generation: u64,
        /// Number of generated node types
        node_types: usize,
    },
}

/// Background discovery of generated node types.
///
/// Results live behind a mutex; completion is posted to a queue that the
/// owning thread drains with [`pump`](Self::pump). In-flight work is never
/// cancelled: [`clear`](Self::clear), [`invalidate`](Self::invalidate) and
/// drop block until it finishes.
pub struct NodeTypeCache {
    group_id: u16,
    registry: Arc<TypeRegistry>,
    cache: Arc<Mutex<Option<Arc<GroupArchetype>>>>,
    task: Option<JoinHandle<()>>,
    sender: Sender<DiscoveryEvent>,
    receiver: Receiver<DiscoveryEvent>,
    generation: u64,
}

impl fmt::Debug for NodeTypeCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeTypeCache")
            .field("group_id", &self.group_id)
            .field("generation", &self.generation)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl NodeTypeCache {
    /// Create a cache generating into [`DISCOVERED_GROUP_ID`]
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self::with_group(DISCOVERED_GROUP_ID, registry)
    }

    /// Create a cache generating into `group_id`
    pub fn with_group(group_id: u16, registry: Arc<TypeRegistry>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            group_id,
            registry,
            cache: Arc::new(Mutex::new(None)),
            task: None,
            sender,
            receiver,
            generation: 0,
        }
    }

    /// Current cache generation, bumped by every clear and invalidation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a discovery pass is in flight
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Cached group, if discovery has completed
    pub fn cached(&self) -> Option<Arc<GroupArchetype>> {
        self.cache.lock().clone()
    }

    /// Cached group, starting discovery in the background when missing
    pub fn request(&mut self) -> Option<Arc<GroupArchetype>> {
        if let Some(group) = self.cached() {
            return Some(group);
        }
        if self.task.is_none() {
            self.start();
        }
        None
    }

    fn start(&mut self) {
        let registry = self.registry.clone();
        let cache = self.cache.clone();
        let sender = self.sender.clone();
        let (group_id, generation) = (self.group_id, self.generation);
        let work = move || {
            let group = registry.discover(group_id);
            let node_types = group.archetypes.len();
            *cache.lock() = Some(Arc::new(group));
            if sender
                .send(DiscoveryEvent::Finished {
                    generation,
                    node_types,
                })
                .is_err()
            {
                tracing::debug!("Discovery finished after its cache was dropped (generation {})", generation);
            }
        };

        tracing::debug!("Starting node type discovery (generation {})", generation);
        match std::thread::Builder::new()
            .name("visject-discovery".into())
            .spawn(work.clone())
        {
            Ok(handle) => self.task = Some(handle),
            Err(err) => {
                tracing::warn!("Failed to spawn discovery thread, running inline: {}", err);
                work();
            }
        }
    }

    /// Block until in-flight discovery finishes; returns the cached group
    pub fn wait(&mut self) -> Option<Arc<GroupArchetype>> {
        self.join();
        self.cached()
    }

    fn join(&mut self) {
        if let Some(task) = self.task.take() {
            if task.join().is_err() {
                tracing::error!("Node type discovery panicked");
            }
        }
    }

    /// Drain completion notifications, registering finished groups in `factory`.
    ///
    /// Returns the number of groups registered. Notifications from before the
    /// last invalidation are dropped.
    pub fn pump(&mut self, factory: &mut NodeFactory) -> usize {
        let mut registered = 0;
        while let Ok(event) = self.receiver.try_recv() {
            let DiscoveryEvent::Finished {
                generation,
                node_types,
            } = event;
            if generation != self.generation {
                tracing::debug!("Dropping stale discovery result (generation {})", generation);
                continue;
            }
            if let Some(group) = self.cached() {
                tracing::info!("Discovered {} node types", node_types);
                factory.register_group(GroupArchetype::clone(&group));
                registered += 1;
            }
        }
        if self.task.as_ref().is_some_and(JoinHandle::is_finished) {
            self.join();
        }
        registered
    }

    /// Wait for in-flight discovery and drop the cached group.
    ///
    /// Starts a new generation, so a notification from the finished pass
    /// is not registered.
    pub fn clear(&mut self) {
        self.join();
        *self.cache.lock() = None;
        self.generation += 1;
    }

    /// Script types changed: wait, drop the cache and switch registries
    pub fn invalidate(&mut self, registry: Arc<TypeRegistry>) {
        self.clear();
        self.registry = registry;
    }
}

impl Drop for NodeTypeCache {
    fn drop(&mut self) {
        self.join();
    }
}
