use sophia_api::term::{BnodeId, SimpleTerm, Term};
use uuid::Uuid;

/// Blank node labels local to one load.
///
/// Blank nodes of two documents are never the same node,
/// even if they share a label.
/// Every [`BnodeScope`] prefixes the labels it sees with its own unique prefix,
/// so that loading two documents in the same store keeps their blank nodes apart.
#[derive(Clone, Debug)]
pub struct BnodeScope {
    prefix: String,
}

impl BnodeScope {
    pub fn new() -> Self {
        BnodeScope {
            prefix: format!("n{}", Uuid::new_v4().simple()),
        }
    }

    /// The prefix prepended to the labels of this scope.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Relabel `term` if it is a blank node, copy it unchanged otherwise.
    pub fn term<T: Term>(&self, term: T) -> SimpleTerm<'static> {
        let label = term.bnode_id().map(|id| format!("{}_{}", self.prefix, id.as_str()));
        match label {
            Some(label) => BnodeId::new_unchecked(label).into_term(),
            None => term.into_term(),
        }
    }
}

impl Default for BnodeScope {
    fn default() -> Self {
        Self::new()
    }
}
