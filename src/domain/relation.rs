//! Relation model: typed, directed edges between types (or from an actor to a type).

use crate::domain::model::TypeId;
use std::fmt;

/// Multiplicity on one side of a cardinality edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Multiplicity {
    Unknown,
    ZeroOrOne,
    ExactlyOne,
    ZeroOrMany,
    OneOrMany,
}

impl Multiplicity {
    pub const ALL: [Multiplicity; 5] = [
        Multiplicity::Unknown,
        Multiplicity::ZeroOrOne,
        Multiplicity::ExactlyOne,
        Multiplicity::ZeroOrMany,
        Multiplicity::OneOrMany,
    ];

    pub fn is_many(self) -> bool {
        matches!(self, Multiplicity::ZeroOrMany | Multiplicity::OneOrMany)
    }

    fn left_marker(self) -> &'static str {
        match self {
            Multiplicity::Unknown => "",
            Multiplicity::ZeroOrOne => "|o",
            Multiplicity::ExactlyOne => "||",
            Multiplicity::ZeroOrMany => "}o",
            Multiplicity::OneOrMany => "}|",
        }
    }

    fn right_marker(self) -> &'static str {
        match self {
            Multiplicity::Unknown => "",
            Multiplicity::ZeroOrOne => "o|",
            Multiplicity::ExactlyOne => "||",
            Multiplicity::ZeroOrMany => "o{",
            Multiplicity::OneOrMany => "|{",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Multiplicity::Unknown => "unknown",
            Multiplicity::ZeroOrOne => "zero-or-one",
            Multiplicity::ExactlyOne => "exactly-one",
            Multiplicity::ZeroOrMany => "many",
            Multiplicity::OneOrMany => "one-or-many",
        }
    }
}

/// One of the eighteen cardinality kinds: `left` is the source side, `right` the target side.
///
/// The source side is always known. A single-valued source (zero-or-one, exactly-one) may face
/// any target side, unknown included; a many-valued source always faces a known target side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cardinality {
    left: Multiplicity,
    right: Multiplicity,
}

impl Cardinality {
    pub const ONE_TO_MANY: Self = Self::of(Multiplicity::ExactlyOne, Multiplicity::ZeroOrMany);
    pub const ONE_TO_ONE_OR_MANY: Self = Self::of(Multiplicity::ExactlyOne, Multiplicity::OneOrMany);
    pub const ONE_TO_UNKNOWN: Self = Self::of(Multiplicity::ExactlyOne, Multiplicity::Unknown);
    pub const ONE_TO_ONE: Self = Self::of(Multiplicity::ExactlyOne, Multiplicity::ExactlyOne);
    pub const ONE_TO_ZERO_OR_ONE: Self = Self::of(Multiplicity::ExactlyOne, Multiplicity::ZeroOrOne);
    pub const ZERO_OR_ONE_TO_MANY: Self = Self::of(Multiplicity::ZeroOrOne, Multiplicity::ZeroOrMany);
    pub const ZERO_OR_ONE_TO_ONE_OR_MANY: Self =
        Self::of(Multiplicity::ZeroOrOne, Multiplicity::OneOrMany);
    pub const ZERO_OR_ONE_TO_UNKNOWN: Self = Self::of(Multiplicity::ZeroOrOne, Multiplicity::Unknown);
    pub const ZERO_OR_ONE_TO_ZERO_OR_ONE: Self =
        Self::of(Multiplicity::ZeroOrOne, Multiplicity::ZeroOrOne);
    pub const MANY_TO_ONE: Self = Self::of(Multiplicity::ZeroOrMany, Multiplicity::ExactlyOne);
    pub const MANY_TO_MANY: Self = Self::of(Multiplicity::ZeroOrMany, Multiplicity::ZeroOrMany);
    pub const ONE_OR_MANY_TO_ONE: Self = Self::of(Multiplicity::OneOrMany, Multiplicity::ExactlyOne);
    pub const ONE_OR_MANY_TO_ONE_OR_MANY: Self =
        Self::of(Multiplicity::OneOrMany, Multiplicity::OneOrMany);

    const fn of(left: Multiplicity, right: Multiplicity) -> Self {
        Self { left, right }
    }

    /// `None` for combinations outside the eighteen kinds.
    pub fn new(left: Multiplicity, right: Multiplicity) -> Option<Self> {
        let valid = match left {
            Multiplicity::Unknown => false,
            Multiplicity::ZeroOrOne | Multiplicity::ExactlyOne => true,
            Multiplicity::ZeroOrMany | Multiplicity::OneOrMany => right != Multiplicity::Unknown,
        };
        valid.then_some(Self { left, right })
    }

    /// Every valid kind, in declaration order
    pub fn all() -> Vec<Cardinality> {
        Multiplicity::ALL
            .iter()
            .flat_map(|&l| Multiplicity::ALL.iter().filter_map(move |&r| Self::new(l, r)))
            .collect()
    }

    pub fn left(self) -> Multiplicity {
        self.left
    }

    pub fn right(self) -> Multiplicity {
        self.right
    }

    pub fn arrow(self) -> String {
        format!("{}--{}", self.left.left_marker(), self.right.right_marker())
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-to-{}", self.left.name(), self.right.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationKind {
    Uses,
    UsedBy,
    UsesAsMember,
    UsesAsParameter,
    UsesAsReturn,
    Implements,
    ImplementedBy,
    Extends,
    ExtendedBy,
    Aggregates,
    Composes,
    ActorInteraction,
    Cardinality(Cardinality),
}

/// Kinds sharing an arrow class collapse onto one edge between the same two endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArrowClass {
    Usage,
    Hierarchy,
    Structure,
    Interaction,
    Cardinality,
}

impl RelationKind {
    pub fn arrow_class(self) -> ArrowClass {
        match self {
            RelationKind::Uses
            | RelationKind::UsedBy
            | RelationKind::UsesAsMember
            | RelationKind::UsesAsParameter
            | RelationKind::UsesAsReturn => ArrowClass::Usage,
            RelationKind::Implements
            | RelationKind::ImplementedBy
            | RelationKind::Extends
            | RelationKind::ExtendedBy => ArrowClass::Hierarchy,
            RelationKind::Aggregates | RelationKind::Composes => ArrowClass::Structure,
            RelationKind::ActorInteraction => ArrowClass::Interaction,
            RelationKind::Cardinality(_) => ArrowClass::Cardinality,
        }
    }

    /// Inverse kinds are drawn from the referenced type back to the referencing one
    /// (`S <|-- T` means `T` extends `S`).
    pub fn is_inverse(self) -> bool {
        matches!(
            self,
            RelationKind::UsedBy | RelationKind::ImplementedBy | RelationKind::ExtendedBy
        )
    }

    /// Forward counterpart of an inverse hierarchy kind. Inverse hierarchy edges are drawn in
    /// forward orientation so the `up` layout hint keeps parents above children.
    pub fn forward_hierarchy(self) -> Option<RelationKind> {
        match self {
            RelationKind::ImplementedBy => Some(RelationKind::Implements),
            RelationKind::ExtendedBy => Some(RelationKind::Extends),
            _ => None,
        }
    }

    pub fn arrow(self, color: Option<&str>) -> String {
        let color = color.map(|c| c.trim_start_matches('#'));
        match (self, color) {
            (RelationKind::Uses, _) => "..>".into(),
            (RelationKind::UsedBy, _) => "<..".into(),
            (RelationKind::UsesAsMember, Some(c)) => format!("-[#{c}]->"),
            (RelationKind::UsesAsMember, None) => "-->".into(),
            (RelationKind::UsesAsParameter | RelationKind::UsesAsReturn, Some(c)) => {
                format!(".[#{c}].>")
            }
            (RelationKind::UsesAsParameter | RelationKind::UsesAsReturn, None) => "..>".into(),
            (RelationKind::Implements, _) => ".up.|>".into(),
            (RelationKind::ImplementedBy, _) => "<|..".into(),
            (RelationKind::Extends, _) => "-up-|>".into(),
            (RelationKind::ExtendedBy, _) => "<|--".into(),
            (RelationKind::Aggregates, _) => "*-".into(),
            (RelationKind::Composes, _) => "\"*\" o- \"1\"".into(),
            (RelationKind::ActorInteraction, _) => ".right.>".into(),
            (RelationKind::Cardinality(c), _) => c.arrow(),
        }
    }
}

/// Either end of a relation that can originate an edge
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Endpoint {
    Actor(String),
    Type(TypeId),
}

impl Endpoint {
    pub fn name(&self) -> &str {
        match self {
            Endpoint::Actor(name) | Endpoint::Type(name) => name,
        }
    }
}

/// Deduplication key: (from, to, arrow class), with inverse kinds normalised so that
/// `A uses B` and `B used-by A` share one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationKey {
    pub from: Endpoint,
    pub to: Endpoint,
    pub class: ArrowClass,
    /// Interaction label; each distinct member an actor invokes is its own edge
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub source: Endpoint,
    pub target: TypeId,
    pub kind: RelationKind,
    pub label: Option<String>,
    pub color: Option<String>,
    /// Accumulated member names, one per line
    pub action: Option<String>,
}

impl Relation {
    pub fn new(source: impl Into<TypeId>, target: impl Into<TypeId>, kind: RelationKind) -> Self {
        Self {
            source: Endpoint::Type(source.into()),
            target: target.into(),
            kind,
            label: None,
            color: None,
            action: None,
        }
    }

    /// Actor-interaction edge labelled with the member the actor invokes
    pub fn interaction(actor: impl Into<String>, target: impl Into<TypeId>, member: impl Into<String>) -> Self {
        Self {
            source: Endpoint::Actor(actor.into()),
            target: target.into(),
            kind: RelationKind::ActorInteraction,
            label: Some(member.into()),
            color: None,
            action: None,
        }
    }

    pub fn with_action(mut self, action: Option<String>) -> Self {
        self.action = action.filter(|a| !a.is_empty());
        self
    }

    pub fn with_color(mut self, color: Option<String>) -> Self {
        self.color = color.filter(|c| !c.is_empty());
        self
    }

    pub fn arrow(&self) -> String {
        self.kind.arrow(self.color.as_deref())
    }

    pub fn source_type(&self) -> Option<&str> {
        match &self.source {
            Endpoint::Type(t) => Some(t),
            Endpoint::Actor(_) => None,
        }
    }

    pub fn actor(&self) -> Option<&str> {
        match &self.source {
            Endpoint::Actor(a) => Some(a),
            Endpoint::Type(_) => None,
        }
    }

    pub fn is_self_edge(&self) -> bool {
        self.source_type() == Some(self.target.as_str())
    }

    pub fn key(&self) -> RelationKey {
        let target = Endpoint::Type(self.target.clone());
        let (from, to) = if self.kind.is_inverse() {
            (target, self.source.clone())
        } else {
            (self.source.clone(), target)
        };
        let label = match self.kind {
            RelationKind::ActorInteraction => self.label.clone(),
            _ => None,
        };
        RelationKey {
            from,
            to,
            class: self.kind.arrow_class(),
            label,
        }
    }

    /// The same edge in forward orientation, for inverse hierarchy kinds.
    pub fn to_forward(&self) -> Option<Relation> {
        let forward = self.kind.forward_hierarchy()?;
        let source = self.source_type()?;
        Some(
            Relation::new(self.target.as_str(), source, forward)
                .with_color(self.color.clone())
                .with_action(self.action.clone()),
        )
    }
}
