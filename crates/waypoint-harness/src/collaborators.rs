#![forbid(unsafe_code)]

//! Recording element factory, patcher, and container fixtures.

use std::sync::Arc;

use waypoint_core::{
    ArgumentRouteStorage, Arguments, ConcreteStack, Element, ElementFactory, ElementId,
    HasArguments, Route, RouteStorage, RouteStorageError, Router, RouterConfig, StackDiff,
    StackPatcher, TransitionConfig,
};

/// A fake presentation surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TestContainer {
    /// Numeric id, recorded on units created inside this container.
    pub id: u32,
    /// Human-readable name for assertion messages.
    pub name: String,
}

impl TestContainer {
    /// Create a container.
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A fake displayable unit.
#[derive(Debug)]
pub struct TestUnit {
    /// Creation order across the owning factory, starting at 1.
    pub serial: u64,
    /// Element this unit was built for.
    pub element: ElementId,
    /// Container the unit was created in.
    pub container: u32,
    arguments: Option<Arguments>,
}

impl TestUnit {
    /// A unit with no arguments bag.
    pub fn new(serial: u64, element: ElementId, container: u32) -> Self {
        Self {
            serial,
            element,
            container,
            arguments: None,
        }
    }
}

impl HasArguments for TestUnit {
    fn arguments(&self) -> Option<&Arguments> {
        self.arguments.as_ref()
    }

    fn arguments_mut(&mut self) -> &mut Arguments {
        self.arguments.get_or_insert_with(Arguments::new)
    }
}

/// Element factory that counts and records every creation.
#[derive(Debug)]
pub struct CountingFactory<R> {
    storage: ArgumentRouteStorage<R>,
    created: Vec<ElementId>,
    next_serial: u64,
}

impl<R> Default for CountingFactory<R> {
    fn default() -> Self {
        Self::new(ArgumentRouteStorage::new())
    }
}

impl<R> CountingFactory<R> {
    /// Factory storing routes through `storage`.
    pub fn new(storage: ArgumentRouteStorage<R>) -> Self {
        Self {
            storage,
            created: Vec::new(),
            next_serial: 1,
        }
    }

    /// Elements the factory was asked to create, in order.
    pub fn created(&self) -> &[ElementId] {
        &self.created
    }

    /// Number of units created.
    pub fn created_count(&self) -> usize {
        self.created.len()
    }

    /// The route storage used for created units.
    pub fn storage(&self) -> &ArgumentRouteStorage<R> {
        &self.storage
    }
}

impl<R: Route + Send + Sync + 'static> CountingFactory<R> {
    /// Look up the route stored on `unit`.
    pub fn route_of(&self, unit: &TestUnit) -> Result<R, RouteStorageError> {
        self.storage.get(unit)
    }
}

impl<R: Route + Send + Sync + 'static> ElementFactory<R, TestContainer> for CountingFactory<R> {
    type Unit = Arc<TestUnit>;

    fn create(&mut self, element: &Element<R>, container: &TestContainer) -> Arc<TestUnit> {
        let mut unit = TestUnit::new(self.next_serial, element.id(), container.id);
        self.next_serial += 1;
        self.storage.store(&mut unit, element.route().clone());
        self.created.push(element.id());
        tracing::trace!(serial = unit.serial, element = %element.id(), "test unit created");
        Arc::new(unit)
    }
}

/// Everything a single patch call received.
#[derive(Debug, Clone)]
pub struct PatchRecord<R> {
    /// Container id passed to the patcher.
    pub container: u32,
    /// Transition passed to the patcher.
    pub transition: TransitionConfig,
    /// Old concrete stack identities, bottom to top.
    pub old_ids: Vec<ElementId>,
    /// New concrete stack identities, bottom to top.
    pub new_ids: Vec<ElementId>,
    /// Old routes, bottom to top.
    pub old_routes: Vec<R>,
    /// New routes, bottom to top.
    pub new_routes: Vec<R>,
    /// Unit serials of the new stack, bottom to top.
    pub new_serials: Vec<u64>,
    /// Identity diff between old and new.
    pub diff: StackDiff,
}

/// Stack patcher that records every call.
#[derive(Debug)]
pub struct RecordingPatcher<R> {
    records: Vec<PatchRecord<R>>,
}

impl<R> Default for RecordingPatcher<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<R> RecordingPatcher<R> {
    /// All recorded patches, oldest first.
    pub fn records(&self) -> &[PatchRecord<R>] {
        &self.records
    }

    /// The most recent patch.
    pub fn last(&self) -> Option<&PatchRecord<R>> {
        self.records.last()
    }

    /// Number of patch calls.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the patcher was never called.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Forget recorded patches.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl<R: Route> StackPatcher<R, TestContainer, Arc<TestUnit>> for RecordingPatcher<R> {
    fn patch(
        &mut self,
        transition: &TransitionConfig,
        container: &TestContainer,
        old: &ConcreteStack<R, Arc<TestUnit>>,
        new: &ConcreteStack<R, Arc<TestUnit>>,
    ) {
        self.records.push(PatchRecord {
            container: container.id,
            transition: *transition,
            old_ids: old.ids().collect(),
            new_ids: new.ids().collect(),
            old_routes: old.routes().cloned().collect(),
            new_routes: new.routes().cloned().collect(),
            new_serials: new.units().map(|u| u.serial).collect(),
            diff: StackDiff::of_concrete(old, new),
        });
    }
}

/// Router wired to the recording collaborators.
pub type TestRouter<R> = Router<R, TestContainer, CountingFactory<R>, RecordingPatcher<R>>;

/// Detached test router whose first attach shows `initial`.
pub fn test_router<R, I>(initial: I) -> TestRouter<R>
where
    R: Route + Send + Sync + 'static,
    I: IntoIterator<Item = R>,
{
    test_router_with(RouterConfig::new().with_initial_routes(initial))
}

/// Detached test router built from `config`.
pub fn test_router_with<R: Route + Send + Sync + 'static>(config: RouterConfig<R>) -> TestRouter<R> {
    Router::new(config, CountingFactory::default(), RecordingPatcher::default())
}
