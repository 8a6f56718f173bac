use crate::util::intern::Interned;

/// Declaration tracker used by the code generator.
///
/// It records which names were declared at which block depth. It only feeds
/// diagnostics (and the choice between a declaration and an assignment); it
/// never rejects a program.
#[derive(Debug, Default)]
pub struct Scope {
    entries: Vec<(Interned, u32)>,
    depth: u32,
}

impl Scope {
    pub fn new() -> Scope {
        Scope::default()
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn enter(&mut self) {
        self.depth += 1;
    }

    /// Drops every name declared at the depth being left (or deeper).
    pub fn leave(&mut self) {
        let depth = self.depth;
        self.entries.retain(|&(_, declared_at)| declared_at < depth);
        self.depth = depth.saturating_sub(1);
    }

    /// Declares `name` at the current depth. Declaring a name twice at the
    /// same depth is a no-op.
    pub fn declare(&mut self, name: Interned) {
        let exists = self
            .entries
            .iter()
            .any(|&(other, declared_at)| other == name && declared_at == self.depth);
        if !exists {
            self.entries.push((name, self.depth));
        }
    }

    /// Checks whether `name` is declared at any depth.
    pub fn is_known(&self, name: Interned) -> bool {
        self.entries.iter().any(|&(other, _)| other == name)
    }

    pub fn reset(&mut self) {
        self.entries.clear();
        self.depth = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::intern::Interner;

    #[test]
    fn test_leave_drops_inner_declarations() {
        let mut i = Interner::default();
        let (a, b) = (i.intern("a"), i.intern("b"));

        let mut scope = Scope::new();
        scope.enter();
        scope.declare(a);
        scope.enter();
        scope.declare(b);
        assert!(scope.is_known(a));
        assert!(scope.is_known(b));

        scope.leave();
        assert_eq!(scope.depth(), 1);
        assert!(scope.is_known(a));
        assert!(!scope.is_known(b));

        scope.leave();
        assert!(!scope.is_known(a));
    }

    #[test]
    fn test_outer_names_survive_inner_redeclaration() {
        let mut i = Interner::default();
        let a = i.intern("a");

        let mut scope = Scope::new();
        scope.enter();
        scope.declare(a);
        scope.enter();
        scope.declare(a);
        scope.declare(a);
        assert_eq!(scope.entries.len(), 2);

        scope.leave();
        assert!(scope.is_known(a));
        assert_eq!(scope.entries.len(), 1);
    }

    #[test]
    fn test_reset() {
        let mut i = Interner::default();
        let mut scope = Scope::new();
        scope.enter();
        scope.declare(i.intern("a"));
        scope.reset();
        assert_eq!(scope.depth(), 0);
        assert!(!scope.is_known(i.intern("a")));
    }
}
