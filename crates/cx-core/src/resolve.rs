//! Fuzzy resolution of user-typed names.
//!
//! Matching is case-insensitive and runs in three passes, stopping at the
//! first pass that produces a hit:
//!
//! 1. exact match on a primary name,
//! 2. exact match on an alias (role, tag, address),
//! 3. prefix match on a primary name or an alias.
//!
//! A server literally named `web` therefore always wins over a server that
//! merely carries the `web` role. Within a pass, several matching candidates
//! are ambiguous unless the caller asks for first-wins.

use cx_proto::{Container, Job, Server, Service, Stack};

use crate::error::ResolveError;

/// One searchable entity.
#[derive(Debug, Clone)]
pub struct Candidate<T> {
    /// Primary name.
    pub name: String,
    /// Secondary names the entity also answers to.
    pub aliases: Vec<String>,
    /// The entity itself.
    pub entity: T,
}

impl<T> Candidate<T> {
    /// A candidate without aliases.
    pub fn new(name: impl Into<String>, entity: T) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            entity,
        }
    }

    /// Add an alias.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }
}

/// Resolve `query` against `candidates`.
///
/// When `prefer_first` is set, a pass with several hits returns the first
/// candidate in iteration order instead of failing.
///
/// # Errors
///
/// [`ResolveError::Ambiguous`] when a pass has several hits and
/// `prefer_first` is unset, [`ResolveError::NotFound`] when no pass has any.
pub fn resolve<'a, T>(
    candidates: &'a [Candidate<T>],
    query: &str,
    prefer_first: bool,
) -> Result<&'a T, ResolveError> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Err(ResolveError::NotFound(query.to_string()));
    }

    let passes: [&dyn Fn(&Candidate<T>) -> bool; 3] = [
        &|c: &Candidate<T>| c.name.to_lowercase() == needle,
        &|c: &Candidate<T>| c.aliases.iter().any(|a| a.to_lowercase() == needle),
        &|c: &Candidate<T>| {
            c.name.to_lowercase().starts_with(&needle)
                || c.aliases.iter().any(|a| a.to_lowercase().starts_with(&needle))
        },
    ];

    for is_hit in passes {
        let mut hits = candidates.iter().filter(|&c| is_hit(c));
        let Some(first) = hits.next() else {
            continue;
        };
        if hits.next().is_some() && !prefer_first {
            return Err(ResolveError::Ambiguous(query.to_string()));
        }
        return Ok(&first.entity);
    }

    Err(ResolveError::NotFound(query.to_string()))
}

/// Find a server by name, role or address.
pub fn find_server<'a>(
    servers: &'a [Server],
    query: &str,
    prefer_first: bool,
) -> Result<&'a Server, ResolveError> {
    let candidates: Vec<Candidate<&Server>> = servers
        .iter()
        .map(|server| {
            let mut candidate = Candidate::new(&server.name, server);
            candidate.aliases.extend(server.roles.iter().cloned());
            candidate.aliases.extend(server.address.iter().cloned());
            candidate
        })
        .collect();
    resolve(&candidates, query, prefer_first).copied()
}

/// Find a stack by name, optionally restricted to one environment.
pub fn find_stack<'a>(
    stacks: &'a [Stack],
    query: &str,
    environment: Option<&str>,
    prefer_first: bool,
) -> Result<&'a Stack, ResolveError> {
    let candidates: Vec<Candidate<&Stack>> = stacks
        .iter()
        .filter(|stack| environment.is_none_or(|env| stack.environment.eq_ignore_ascii_case(env)))
        .map(|stack| Candidate::new(&stack.name, stack))
        .collect();
    resolve(&candidates, query, prefer_first).copied()
}

/// Find a container by name or UID.
pub fn find_container<'a>(
    containers: &'a [Container],
    query: &str,
) -> Result<&'a Container, ResolveError> {
    let candidates: Vec<Candidate<&Container>> = containers
        .iter()
        .map(|c| Candidate::new(&c.name, c).with_alias(&c.uid))
        .collect();
    resolve(&candidates, query, false).copied()
}

/// Find a service by name.
pub fn find_service<'a>(services: &'a [Service], query: &str) -> Result<&'a Service, ResolveError> {
    let candidates: Vec<Candidate<&Service>> = services
        .iter()
        .map(|s| Candidate::new(&s.name, s))
        .collect();
    resolve(&candidates, query, false).copied()
}

/// Find a job by name or numeric id.
pub fn find_job<'a>(jobs: &'a [Job], query: &str) -> Result<&'a Job, ResolveError> {
    let candidates: Vec<Candidate<&Job>> = jobs
        .iter()
        .map(|j| Candidate::new(j.name(), j).with_alias(j.id().to_string()))
        .collect();
    resolve(&candidates, query, false).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cx_proto::{BasicJob, StackHealth, StackStatus};
    use proptest::prelude::*;
    use test_case::test_case;

    fn names(list: &[&str]) -> Vec<Candidate<String>> {
        list.iter().map(|n| Candidate::new(*n, (*n).to_string())).collect()
    }

    #[test]
    fn primary_name_beats_role_alias() {
        let servers = vec![
            Server::new("srv-1", "lion").with_role("web"),
            Server::new("srv-2", "web"),
        ];
        let found = find_server(&servers, "web", false).expect("resolves");
        assert_eq!(found.uid, "srv-2");
    }

    #[test]
    fn prefix_ambiguity_reported() {
        let candidates = names(&["orca", "orchid"]);
        assert_eq!(
            resolve(&candidates, "or", false),
            Err(ResolveError::Ambiguous("or".into()))
        );
    }

    #[test]
    fn prefix_ambiguity_first_wins() {
        let candidates = names(&["orca", "orchid"]);
        for _ in 0..10 {
            assert_eq!(resolve(&candidates, "or", true).map(String::as_str), Ok("orca"));
        }
    }

    #[test]
    fn unknown_name_not_found() {
        let candidates = names(&["lion", "tiger"]);
        assert_eq!(
            resolve(&candidates, "zebra", false),
            Err(ResolveError::NotFound("zebra".into()))
        );
    }

    #[test_case("LION", "lion" ; "exact ignores case")]
    #[test_case("ti", "tiger" ; "unique prefix")]
    #[test_case("Tig", "tiger" ; "prefix ignores case")]
    #[test_case("lion", "lion" ; "exact beats longer prefix")]
    fn resolves(query: &str, expected: &str) {
        let candidates = names(&["lion", "tiger", "lioness"]);
        assert_eq!(resolve(&candidates, query, false).map(String::as_str), Ok(expected));
    }

    #[test]
    fn empty_query_not_found() {
        let candidates = names(&["lion"]);
        assert!(matches!(resolve(&candidates, "  ", true), Err(ResolveError::NotFound(_))));
    }

    #[test]
    fn duplicate_exact_names_are_ambiguous() {
        let candidates = names(&["web", "web"]);
        assert!(matches!(resolve(&candidates, "web", false), Err(ResolveError::Ambiguous(_))));
        assert!(resolve(&candidates, "web", true).is_ok());
    }

    #[test]
    fn shared_role_is_ambiguous_without_first_wins() {
        let servers = vec![
            Server::new("srv-1", "lion").with_role("web"),
            Server::new("srv-2", "tiger").with_role("web"),
        ];
        assert!(matches!(
            find_server(&servers, "web", false),
            Err(ResolveError::Ambiguous(_))
        ));
        assert_eq!(find_server(&servers, "web", true).expect("first").uid, "srv-1");
    }

    #[test]
    fn one_server_is_not_ambiguous_with_itself() {
        let servers = vec![Server::new("srv-1", "app").with_role("application")];
        assert_eq!(find_server(&servers, "ap", false).expect("unique").uid, "srv-1");
    }

    #[test]
    fn server_found_by_address() {
        let servers = vec![
            Server::new("srv-1", "lion").with_address("10.0.0.1"),
            Server::new("srv-2", "tiger").with_address("10.0.0.2"),
        ];
        assert_eq!(find_server(&servers, "10.0.0.2", false).expect("found").uid, "srv-2");
    }

    #[test]
    fn stack_filtered_by_environment() {
        let stacks = vec![
            Stack::new("s-1", "shop", "staging"),
            Stack::new("s-2", "shop", "production")
                .with_state(StackStatus::Success, StackHealth::Ok),
        ];
        assert!(matches!(
            find_stack(&stacks, "shop", None, false),
            Err(ResolveError::Ambiguous(_))
        ));
        let found = find_stack(&stacks, "shop", Some("Production"), false).expect("found");
        assert_eq!(found.uid, "s-2");
        assert!(matches!(
            find_stack(&stacks, "shop", Some("qa"), false),
            Err(ResolveError::NotFound(_))
        ));
    }

    #[test]
    fn container_found_by_uid() {
        let containers = vec![Container::new("abc123", "web.1"), Container::new("def456", "web.2")];
        assert_eq!(find_container(&containers, "def4").expect("found").name, "web.2");
        assert!(find_container(&containers, "web").is_err());
    }

    #[test]
    fn job_found_by_id() {
        let jobs = vec![Job::Basic(BasicJob {
            id: 42,
            name: "cleanup".into(),
            cron: None,
            status: None,
            command: "true".into(),
        })];
        assert_eq!(find_job(&jobs, "42").expect("found").name(), "cleanup");
        assert_eq!(find_job(&jobs, "clean").expect("found").id(), 42);
    }

    proptest! {
        #[test]
        fn prop_primary_name_always_beats_alias(
            query in "[a-z]{3,8}",
            fillers in proptest::collection::vec("[0-9]{3,6}", 0..6),
            alias_first in any::<bool>(),
            prefer_first in any::<bool>(),
        ) {
            let named = Candidate::new(query.clone(), "named".to_string());
            let tagged = Candidate::new(format!("{query}-host"), "tagged".to_string())
                .with_alias(query.to_uppercase());
            let mut candidates: Vec<Candidate<String>> = fillers
                .iter()
                .map(|f| Candidate::new(f.clone(), f.clone()))
                .collect();
            if alias_first {
                candidates.insert(0, tagged);
                candidates.push(named);
            } else {
                candidates.insert(0, named);
                candidates.push(tagged);
            }

            let found = resolve(&candidates, &query, prefer_first);
            prop_assert_eq!(found.map(String::as_str), Ok("named"));
        }
    }
}
