use crate::{ResourceId, Triple};

/// The closed set of resource shapes the repository stores. The shape is
/// fixed when a [`Resource`] is built; callers ask capability questions
/// ([`Resource::is_acl`], [`Resource::has_described_resource`]) instead of
/// inspecting types at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceKind {
    /// An RDF source that may contain other resources
    Container,
    /// A non-RDF source (binary content)
    Binary,
    /// The RDF description of a binary
    BinaryDescription {
        /// The binary this description describes
        described: ResourceId,
    },
    /// The version listing of another resource
    TimeMap {
        /// The resource whose versions are listed
        original: ResourceId,
    },
    /// A WebAC access control list
    Acl {
        /// The resource this ACL is attached to
        controlled: ResourceId,
    },
}

/// A read-only view of one repository resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    id: ResourceId,
    kind: ResourceKind,
    container: Option<ResourceId>,
    acl: Option<ResourceId>,
    types: Vec<String>,
    triples: Vec<Triple>,
}

impl Resource {
    /// Create a resource with no container, ACL, types or triples.
    pub fn new(id: ResourceId, kind: ResourceKind) -> Self {
        Self {
            id,
            kind,
            container: None,
            acl: None,
            types: Vec::new(),
            triples: Vec::new(),
        }
    }

    /// Set the resource that contains this one.
    pub fn contained_by(mut self, container: ResourceId) -> Self {
        self.container = Some(container);
        self
    }

    /// Attach the ACL resource that governs this one.
    pub fn with_acl(mut self, acl: ResourceId) -> Self {
        self.acl = Some(acl);
        self
    }

    /// Add an RDF type.
    pub fn with_type(mut self, class: impl Into<String>) -> Self {
        self.types.push(class.into());
        self
    }

    /// Add triples to the resource's graph.
    pub fn with_triples<Triples>(mut self, triples: Triples) -> Self
    where
        Triples: IntoIterator<Item = Triple>,
    {
        self.triples.extend(triples);
        self
    }

    /// The identifier of this resource.
    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    /// The shape of this resource.
    pub fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    /// The containing resource, if any.
    pub fn container(&self) -> Option<&ResourceId> {
        self.container.as_ref()
    }

    /// True when this resource is contained by another.
    pub fn has_container(&self) -> bool {
        self.container.is_some()
    }

    /// The attached ACL resource, if any.
    pub fn acl(&self) -> Option<&ResourceId> {
        self.acl.as_ref()
    }

    /// True for ACL resources.
    pub fn is_acl(&self) -> bool {
        matches!(self.kind, ResourceKind::Acl { .. })
    }

    /// True for binary content and binary descriptions.
    pub fn is_binary_or_description(&self) -> bool {
        matches!(
            self.kind,
            ResourceKind::Binary | ResourceKind::BinaryDescription { .. }
        )
    }

    /// True for resources that stand in for another one (binary descriptions
    /// and time maps).
    pub fn has_described_resource(&self) -> bool {
        matches!(
            self.kind,
            ResourceKind::BinaryDescription { .. } | ResourceKind::TimeMap { .. }
        )
    }

    /// The resource this one describes. Resources that describe nothing
    /// describe themselves.
    pub fn described_resource(&self) -> &ResourceId {
        match &self.kind {
            ResourceKind::BinaryDescription { described } => described,
            ResourceKind::TimeMap { original } => original,
            _ => &self.id,
        }
    }

    /// The RDF types of this resource.
    pub fn types(&self) -> &[String] {
        &self.types
    }

    /// The triples of this resource's graph.
    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }
}
