//! Model construction.
//!
//! [`NetworkBuilder`] collects named element declarations and arcs, then
//! [`NetworkBuilder::build`] resolves every identifier once and validates the
//! whole model. Any configuration problem surfaces here, before a simulation
//! can start.

use std::collections::HashMap;

use tracing::debug;

use crate::distribution::{Distribution, DistributionKind, Sampler};
use crate::elements::{
    Capacity, ElementId, FiringPolicy, Generator, Guard, NetElement, Place, Predicate, Terminator,
    Transition,
};
use crate::error::BuildError;
use crate::network::{Network, DEFAULT_GENERATOR, DEFAULT_TERMINATOR};

#[derive(Debug, Clone)]
struct PlaceDecl {
    id: String,
    capacity: Capacity,
    initial_load: u64,
}

#[derive(Debug, Clone)]
struct TransitionDecl {
    id: String,
    delay: Distribution,
    priority: i32,
    condition: Option<(String, Predicate)>,
}

#[derive(Debug, Clone)]
struct ArcDecl {
    from: String,
    to: String,
    multiplicity: u32,
}

#[derive(Debug, Clone, Default)]
pub struct NetworkBuilder {
    default_generator: Option<Distribution>,
    default_terminator: bool,
    generators: Vec<(String, Distribution)>,
    terminators: Vec<String>,
    places: Vec<PlaceDecl>,
    transitions: Vec<TransitionDecl>,
    arcs: Vec<ArcDecl>,
    policy: FiringPolicy,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the reserved `Generator` element with the given inter-arrival law.
    pub fn default_generator(&mut self, inter_arrival: Distribution) -> &mut Self {
        self.default_generator = Some(inter_arrival);
        self
    }

    /// Adds the reserved `Terminator` element.
    pub fn default_terminator(&mut self) -> &mut Self {
        self.default_terminator = true;
        self
    }

    pub fn firing_policy(&mut self, policy: FiringPolicy) -> &mut Self {
        self.policy = policy;
        self
    }

    pub fn add_generator(
        &mut self,
        id: impl Into<String>,
        inter_arrival: Distribution,
    ) -> &mut Self {
        self.generators.push((id.into(), inter_arrival));
        self
    }

    /// Registers several generators sharing one inter-arrival law.
    pub fn add_generators<I, S>(&mut self, names: I, inter_arrival: Distribution) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.add_generator(name, inter_arrival.clone());
        }
        self
    }

    pub fn add_terminator(&mut self, id: impl Into<String>) -> &mut Self {
        self.terminators.push(id.into());
        self
    }

    pub fn add_terminators<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.terminators.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn add_place(
        &mut self,
        id: impl Into<String>,
        capacity: Capacity,
        initial_load: u64,
    ) -> &mut Self {
        self.places.push(PlaceDecl {
            id: id.into(),
            capacity,
            initial_load,
        });
        self
    }

    pub fn add_transition(
        &mut self,
        id: impl Into<String>,
        delay: Distribution,
        priority: i32,
    ) -> &mut Self {
        self.transitions.push(TransitionDecl {
            id: id.into(),
            delay,
            priority,
            condition: None,
        });
        self
    }

    /// Adds a transition that may only fire while `predicate` holds for the
    /// load of `place`.
    pub fn add_conditional_transition(
        &mut self,
        id: impl Into<String>,
        delay: Distribution,
        priority: i32,
        place: impl Into<String>,
        predicate: Predicate,
    ) -> &mut Self {
        self.transitions.push(TransitionDecl {
            id: id.into(),
            delay,
            priority,
            condition: Some((place.into(), predicate)),
        });
        self
    }

    pub fn add_arc(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        multiplicity: u32,
    ) -> &mut Self {
        self.arcs.push(ArcDecl {
            from: from.into(),
            to: to.into(),
            multiplicity,
        });
        self
    }

    /// Registers `(source, destination, multiplicity)` triples.
    pub fn set_arcs<I, S>(&mut self, arcs: I) -> &mut Self
    where
        I: IntoIterator<Item = (S, S, u32)>,
        S: Into<String>,
    {
        for (from, to, multiplicity) in arcs {
            self.add_arc(from, to, multiplicity);
        }
        self
    }

    /// Resolves identifiers, validates the model and assembles the network.
    pub fn build(self) -> Result<Network, BuildError> {
        let mut index: HashMap<String, ElementId> = HashMap::new();

        let mut generator_ids: Vec<(String, Distribution)> = Vec::new();
        if let Some(inter_arrival) = self.default_generator.clone() {
            generator_ids.push((DEFAULT_GENERATOR.to_string(), inter_arrival));
        }
        for (id, inter_arrival) in &self.generators {
            if self.default_generator.is_some() && id == DEFAULT_GENERATOR {
                return Err(BuildError::ReservedName(id.clone()));
            }
            generator_ids.push((id.clone(), inter_arrival.clone()));
        }

        let mut terminator_ids: Vec<String> = Vec::new();
        if self.default_terminator {
            terminator_ids.push(DEFAULT_TERMINATOR.to_string());
        }
        for id in &self.terminators {
            if self.default_terminator && id == DEFAULT_TERMINATOR {
                return Err(BuildError::ReservedName(id.clone()));
            }
            terminator_ids.push(id.clone());
        }

        for (i, (id, _)) in generator_ids.iter().enumerate() {
            register(&mut index, id, ElementId::Generator(i))?;
        }
        for (i, id) in terminator_ids.iter().enumerate() {
            register(&mut index, id, ElementId::Terminator(i))?;
        }
        for (i, decl) in self.places.iter().enumerate() {
            register(&mut index, &decl.id, ElementId::Place(i))?;
        }
        for (i, decl) in self.transitions.iter().enumerate() {
            register(&mut index, &decl.id, ElementId::Transition(i))?;
        }

        let places = self
            .places
            .iter()
            .map(|decl| {
                match decl.capacity {
                    Capacity::Bounded(0) => return Err(BuildError::ZeroCapacity(decl.id.clone())),
                    Capacity::Bounded(limit) if decl.initial_load > limit => {
                        return Err(BuildError::InitialLoadExceedsCapacity {
                            id: decl.id.clone(),
                            initial_load: decl.initial_load,
                            capacity: limit,
                        })
                    }
                    _ => {}
                }
                Ok(Place::new(&decl.id, decl.capacity, decl.initial_load))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let generators = generator_ids
            .iter()
            .map(|(id, inter_arrival)| {
                if inter_arrival.kind() == DistributionKind::LoadDependent {
                    return Err(BuildError::InvalidDistribution {
                        element: id.clone(),
                        reason: "arrival schedules cannot depend on place load".into(),
                    });
                }
                let sampler =
                    Sampler::resolve(id, inter_arrival, |target| resolve_place(&index, id, target))?;
                Ok(Generator::new(id, sampler))
            })
            .collect::<Result<Vec<_>, BuildError>>()?;

        let transitions = self
            .transitions
            .iter()
            .map(|decl| {
                let sampler = Sampler::resolve(&decl.id, &decl.delay, |target| {
                    resolve_place(&index, &decl.id, target)
                })?;
                let transition = Transition::new(&decl.id, sampler, decl.priority);
                match &decl.condition {
                    Some((target, predicate)) => Ok(transition.with_guard(Guard {
                        place: resolve_place(&index, &decl.id, target)?,
                        predicate: predicate.clone(),
                    })),
                    None => Ok(transition),
                }
            })
            .collect::<Result<Vec<_>, BuildError>>()?;

        let terminators = terminator_ids.iter().map(Terminator::new).collect();

        let mut firing_order: Vec<usize> = (0..transitions.len()).collect();
        firing_order.sort_by_key(|&i| transitions[i].priority());

        let mut network = Network {
            generators,
            places,
            terminators,
            transitions,
            index,
            firing_order,
            policy: self.policy,
        };

        for arc in &self.arcs {
            let from = lookup(&network.index, &arc.from)?;
            let to = lookup(&network.index, &arc.to)?;
            if arc.multiplicity == 0 {
                return Err(BuildError::ZeroMultiplicity {
                    from: arc.from.clone(),
                    to: arc.to.clone(),
                });
            }
            if !arc_allowed(from, to) {
                return Err(BuildError::InvalidArc {
                    from: arc.from.clone(),
                    to: arc.to.clone(),
                    from_kind: from.kind(),
                    to_kind: to.kind(),
                });
            }
            element_mut(&mut network, from).add_output(to, arc.multiplicity);
            element_mut(&mut network, to).add_input(from, arc.multiplicity);
        }

        if let Some(idle) = network.transitions.iter().find(|t| t.inputs().is_empty()) {
            return Err(BuildError::UnconnectedTransition(idle.id().to_string()));
        }

        debug!(
            generators = network.generators.len(),
            places = network.places.len(),
            transitions = network.transitions.len(),
            terminators = network.terminators.len(),
            arcs = self.arcs.len(),
            policy = ?network.policy,
            "Network built"
        );
        Ok(network)
    }
}

fn register(
    index: &mut HashMap<String, ElementId>,
    id: &str,
    handle: ElementId,
) -> Result<(), BuildError> {
    if index.insert(id.to_string(), handle).is_some() {
        return Err(BuildError::DuplicateElement(id.to_string()));
    }
    Ok(())
}

fn lookup(index: &HashMap<String, ElementId>, id: &str) -> Result<ElementId, BuildError> {
    index
        .get(id)
        .copied()
        .ok_or_else(|| BuildError::UnknownElement(id.to_string()))
}

fn resolve_place(
    index: &HashMap<String, ElementId>,
    element: &str,
    target: &str,
) -> Result<usize, BuildError> {
    match lookup(index, target)? {
        ElementId::Place(i) => Ok(i),
        _ => Err(BuildError::NotAPlace {
            element: element.to_string(),
            target: target.to_string(),
        }),
    }
}

/// Token flow is bipartite between places and transitions; generators feed
/// places or sinks directly.
fn arc_allowed(from: ElementId, to: ElementId) -> bool {
    matches!(
        (from, to),
        (
            ElementId::Generator(_),
            ElementId::Place(_) | ElementId::Terminator(_)
        ) | (ElementId::Place(_), ElementId::Transition(_))
            | (
                ElementId::Transition(_),
                ElementId::Place(_) | ElementId::Terminator(_)
            )
    )
}

fn element_mut(network: &mut Network, id: ElementId) -> &mut dyn NetElement {
    match id {
        ElementId::Generator(i) => &mut network.generators[i],
        ElementId::Place(i) => &mut network.places[i],
        ElementId::Transition(i) => &mut network.transitions[i],
        ElementId::Terminator(i) => &mut network.terminators[i],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> NetworkBuilder {
        let mut builder = NetworkBuilder::new();
        builder
            .default_generator(Distribution::constant(1))
            .default_terminator()
            .add_place("queue", Capacity::Bounded(10), 0)
            .add_transition("server", Distribution::constant(2), 1)
            .set_arcs([
                ("Generator", "queue", 1),
                ("queue", "server", 1),
                ("server", "Terminator", 1),
            ]);
        builder
    }

    #[test]
    fn test_builds_pipeline() {
        let network = pipeline().build().unwrap();
        assert_eq!(network.lookup("Generator"), Some(ElementId::Generator(0)));
        assert_eq!(network.lookup("Terminator"), Some(ElementId::Terminator(0)));
        let queue = network.place("queue").unwrap();
        assert_eq!(queue.inputs().len(), 1);
        assert_eq!(queue.outputs()[0].endpoint, ElementId::Transition(0));
        assert_eq!(network.transition("server").unwrap().inputs().len(), 1);
        assert_eq!(network.stocks().len(), 1);
    }

    #[test]
    fn test_unknown_arc_endpoint() {
        let mut builder = pipeline();
        builder.add_arc("queue", "nowhere", 1);
        assert_eq!(
            builder.build().unwrap_err(),
            BuildError::UnknownElement("nowhere".into())
        );
    }

    #[test]
    fn test_reserved_names() {
        let mut builder = pipeline();
        builder.add_terminator("Terminator");
        assert_eq!(
            builder.build().unwrap_err(),
            BuildError::ReservedName("Terminator".into())
        );

        // Without the default, the name is an ordinary identifier.
        let mut builder = NetworkBuilder::new();
        builder.add_terminator("Terminator");
        assert!(builder.build().is_ok());
    }

    #[test]
    fn test_duplicate_ids() {
        let mut builder = pipeline();
        builder.add_place("server", Capacity::Unbounded, 0);
        assert_eq!(
            builder.build().unwrap_err(),
            BuildError::DuplicateElement("server".into())
        );
    }

    #[test]
    fn test_capacity_validation() {
        let mut builder = NetworkBuilder::new();
        builder.add_place("p", Capacity::Bounded(0), 0);
        assert_eq!(builder.build().unwrap_err(), BuildError::ZeroCapacity("p".into()));

        let mut builder = NetworkBuilder::new();
        builder.add_place("p", Capacity::Bounded(2), 3);
        assert!(matches!(
            builder.build().unwrap_err(),
            BuildError::InitialLoadExceedsCapacity { initial_load: 3, capacity: 2, .. }
        ));
    }

    #[test]
    fn test_invalid_arcs() {
        let mut builder = pipeline();
        builder.add_arc("Generator", "server", 1);
        assert!(matches!(
            builder.build().unwrap_err(),
            BuildError::InvalidArc { from_kind: "generator", to_kind: "transition", .. }
        ));

        let mut builder = pipeline();
        builder.add_arc("queue", "server", 0);
        assert!(matches!(builder.build().unwrap_err(), BuildError::ZeroMultiplicity { .. }));
    }

    #[test]
    fn test_generator_rejects_load_dependent_law() {
        let mut builder = NetworkBuilder::new();
        builder
            .add_generator("arrivals", Distribution::load_dependent("queue", |load| load + 1))
            .add_place("queue", Capacity::Unbounded, 0)
            .add_arc("arrivals", "queue", 1);
        assert!(matches!(
            builder.build().unwrap_err(),
            BuildError::InvalidDistribution { element, .. } if element == "arrivals"
        ));
    }

    #[test]
    fn test_condition_must_reference_place() {
        let mut builder = pipeline();
        builder
            .add_conditional_transition(
                "gate",
                Distribution::constant(1),
                2,
                "server",
                Predicate::Below(3),
            )
            .add_arc("queue", "gate", 1);
        assert!(matches!(builder.build().unwrap_err(), BuildError::NotAPlace { .. }));

        let mut builder = pipeline();
        builder.add_conditional_transition(
            "gate",
            Distribution::constant(1),
            2,
            "ghost",
            Predicate::Below(3),
        );
        assert_eq!(
            builder.build().unwrap_err(),
            BuildError::UnknownElement("ghost".into())
        );
    }

    #[test]
    fn test_transition_without_inputs() {
        let mut builder = pipeline();
        builder.add_transition("idle", Distribution::constant(1), 3);
        assert_eq!(
            builder.build().unwrap_err(),
            BuildError::UnconnectedTransition("idle".into())
        );
    }

    #[test]
    fn test_firing_order_is_stable_by_priority() {
        let mut builder = NetworkBuilder::new();
        builder
            .add_place("p", Capacity::Unbounded, 0)
            .add_transition("late", Distribution::constant(1), 5)
            .add_transition("first", Distribution::constant(1), 1)
            .add_transition("tie", Distribution::constant(1), 5)
            .set_arcs([("p", "late", 1), ("p", "first", 1), ("p", "tie", 1)]);
        let network = builder.build().unwrap();
        assert_eq!(network.firing_order(), &[1, 0, 2]);
    }

    #[test]
    fn test_bulk_registration() {
        let mut builder = NetworkBuilder::new();
        builder
            .add_generators(["g1", "g2"], Distribution::constant(3))
            .add_terminators(["t1", "t2"]);
        let network = builder.build().unwrap();
        assert_eq!(network.generators().len(), 2);
        assert_eq!(network.stocks().len(), 2);
        assert_eq!(network.lookup("t2"), Some(ElementId::Terminator(1)));
    }
}
