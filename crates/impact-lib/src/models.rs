//! Core data models for cluster cost snapshots

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Billing class a resource was provisioned under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PricingModel {
    OnDemand,
    Spot,
    SpotFallback,
}

impl PricingModel {
    pub const ALL: [PricingModel; 3] = [
        PricingModel::OnDemand,
        PricingModel::Spot,
        PricingModel::SpotFallback,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PricingModel::OnDemand => "onDemand",
            PricingModel::Spot => "spot",
            PricingModel::SpotFallback => "spotFallback",
        }
    }
}

impl fmt::Display for PricingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource class a quantity and cost are reported for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceClass {
    Cpu,
    Memory,
    Gpu,
    Instance,
}

impl ResourceClass {
    pub const ALL: [ResourceClass; 4] = [
        ResourceClass::Cpu,
        ResourceClass::Memory,
        ResourceClass::Gpu,
        ResourceClass::Instance,
    ];

    /// Classes whose costs add up to the cluster bill.
    ///
    /// Whole-instance cost already contains CPU, memory and GPU cost, so it is
    /// kept out of every total to avoid counting the same spend twice.
    pub const COMPONENTS: [ResourceClass; 3] =
        [ResourceClass::Cpu, ResourceClass::Memory, ResourceClass::Gpu];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceClass::Cpu => "cpu",
            ResourceClass::Memory => "memory",
            ResourceClass::Gpu => "gpu",
            ResourceClass::Instance => "instance",
        }
    }
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per pricing model
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingSplit<T> {
    pub on_demand: T,
    pub spot: T,
    pub spot_fallback: T,
}

impl<T> PricingSplit<T> {
    pub fn new(on_demand: T, spot: T, spot_fallback: T) -> Self {
        Self {
            on_demand,
            spot,
            spot_fallback,
        }
    }

    /// Build a split by evaluating `f` for every pricing model
    pub fn from_fn(mut f: impl FnMut(PricingModel) -> T) -> Self {
        Self {
            on_demand: f(PricingModel::OnDemand),
            spot: f(PricingModel::Spot),
            spot_fallback: f(PricingModel::SpotFallback),
        }
    }

    pub fn get(&self, model: PricingModel) -> &T {
        match model {
            PricingModel::OnDemand => &self.on_demand,
            PricingModel::Spot => &self.spot,
            PricingModel::SpotFallback => &self.spot_fallback,
        }
    }

    pub fn get_mut(&mut self, model: PricingModel) -> &mut T {
        match model {
            PricingModel::OnDemand => &mut self.on_demand,
            PricingModel::Spot => &mut self.spot,
            PricingModel::SpotFallback => &mut self.spot_fallback,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> PricingSplit<U> {
        PricingSplit {
            on_demand: f(&self.on_demand),
            spot: f(&self.spot),
            spot_fallback: f(&self.spot_fallback),
        }
    }
}

impl PricingSplit<f64> {
    pub fn total(&self) -> f64 {
        self.on_demand + self.spot + self.spot_fallback
    }
}

/// One value per resource class
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSplit<T> {
    pub cpu: T,
    pub memory: T,
    pub gpu: T,
    pub instance: T,
}

impl<T> ClassSplit<T> {
    /// Build a split by evaluating `f` for every resource class
    pub fn from_fn(mut f: impl FnMut(ResourceClass) -> T) -> Self {
        Self {
            cpu: f(ResourceClass::Cpu),
            memory: f(ResourceClass::Memory),
            gpu: f(ResourceClass::Gpu),
            instance: f(ResourceClass::Instance),
        }
    }

    pub fn get(&self, class: ResourceClass) -> &T {
        match class {
            ResourceClass::Cpu => &self.cpu,
            ResourceClass::Memory => &self.memory,
            ResourceClass::Gpu => &self.gpu,
            ResourceClass::Instance => &self.instance,
        }
    }

    pub fn get_mut(&mut self, class: ResourceClass) -> &mut T {
        match class {
            ResourceClass::Cpu => &mut self.cpu,
            ResourceClass::Memory => &mut self.memory,
            ResourceClass::Gpu => &mut self.gpu,
            ResourceClass::Instance => &mut self.instance,
        }
    }
}

/// Provisioned quantity and its billed cost for one resource class
///
/// Quantity is a count for CPU, GPU and instances and GiB for memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceLedger {
    pub quantity: PricingSplit<f64>,
    pub total_cost: PricingSplit<f64>,
}

/// One calendar day of cluster cost and efficiency data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    pub cpu: ResourceLedger,
    pub memory: ResourceLedger,
    pub gpu: ResourceLedger,
    pub instance: ResourceLedger,
    pub cpu_used: PricingSplit<f64>,
    pub memory_used_gib: PricingSplit<f64>,
    pub cpu_overprovisioning_percent: PricingSplit<f64>,
    pub memory_overprovisioning_percent: PricingSplit<f64>,
    pub storage_overprovisioning_percent: f64,
}

impl Snapshot {
    /// An all-zero snapshot for the given day
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            cpu: ResourceLedger::default(),
            memory: ResourceLedger::default(),
            gpu: ResourceLedger::default(),
            instance: ResourceLedger::default(),
            cpu_used: PricingSplit::default(),
            memory_used_gib: PricingSplit::default(),
            cpu_overprovisioning_percent: PricingSplit::default(),
            memory_overprovisioning_percent: PricingSplit::default(),
            storage_overprovisioning_percent: 0.0,
        }
    }

    /// Set quantity for a class and pricing model
    pub fn with_quantity(mut self, class: ResourceClass, model: PricingModel, value: f64) -> Self {
        *self.ledger_mut(class).quantity.get_mut(model) = value;
        self
    }

    /// Set total cost for a class and pricing model
    pub fn with_total_cost(
        mut self,
        class: ResourceClass,
        model: PricingModel,
        value: f64,
    ) -> Self {
        *self.ledger_mut(class).total_cost.get_mut(model) = value;
        self
    }

    /// Set consumed quantity; ignored for classes without usage data
    pub fn with_used(mut self, class: ResourceClass, model: PricingModel, value: f64) -> Self {
        match class {
            ResourceClass::Cpu => *self.cpu_used.get_mut(model) = value,
            ResourceClass::Memory => *self.memory_used_gib.get_mut(model) = value,
            _ => {}
        }
        self
    }

    /// Set overprovisioning percentage; ignored for classes without one
    pub fn with_overprovisioning(
        mut self,
        class: ResourceClass,
        model: PricingModel,
        value: f64,
    ) -> Self {
        match class {
            ResourceClass::Cpu => *self.cpu_overprovisioning_percent.get_mut(model) = value,
            ResourceClass::Memory => *self.memory_overprovisioning_percent.get_mut(model) = value,
            _ => {}
        }
        self
    }

    pub fn with_storage_overprovisioning(mut self, value: f64) -> Self {
        self.storage_overprovisioning_percent = value;
        self
    }

    pub fn ledger(&self, class: ResourceClass) -> &ResourceLedger {
        match class {
            ResourceClass::Cpu => &self.cpu,
            ResourceClass::Memory => &self.memory,
            ResourceClass::Gpu => &self.gpu,
            ResourceClass::Instance => &self.instance,
        }
    }

    fn ledger_mut(&mut self, class: ResourceClass) -> &mut ResourceLedger {
        match class {
            ResourceClass::Cpu => &mut self.cpu,
            ResourceClass::Memory => &mut self.memory,
            ResourceClass::Gpu => &mut self.gpu,
            ResourceClass::Instance => &mut self.instance,
        }
    }

    pub fn quantity(&self, class: ResourceClass, model: PricingModel) -> f64 {
        *self.ledger(class).quantity.get(model)
    }

    pub fn total_cost(&self, class: ResourceClass, model: PricingModel) -> f64 {
        *self.ledger(class).total_cost.get(model)
    }

    /// Consumed quantity, `None` for classes the feed carries no usage for
    pub fn used(&self, class: ResourceClass, model: PricingModel) -> Option<f64> {
        match class {
            ResourceClass::Cpu => Some(*self.cpu_used.get(model)),
            ResourceClass::Memory => Some(*self.memory_used_gib.get(model)),
            _ => None,
        }
    }

    /// Overprovisioning percentage, `None` for classes the feed carries none for
    pub fn overprovisioning(&self, class: ResourceClass, model: PricingModel) -> Option<f64> {
        match class {
            ResourceClass::Cpu => Some(*self.cpu_overprovisioning_percent.get(model)),
            ResourceClass::Memory => Some(*self.memory_overprovisioning_percent.get(model)),
            _ => None,
        }
    }

    /// Actual billed cost for one pricing model (CPU + memory + GPU)
    pub fn actual_cost_for(&self, model: PricingModel) -> f64 {
        ResourceClass::COMPONENTS
            .iter()
            .map(|class| self.total_cost(*class, model))
            .sum()
    }

    /// Actual billed cost across all pricing models
    pub fn actual_cost(&self) -> f64 {
        PricingModel::ALL
            .iter()
            .map(|model| self.actual_cost_for(*model))
            .sum()
    }
}
