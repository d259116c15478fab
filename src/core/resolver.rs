use crate::domain::model::{ResolvedService, ServiceDeclaration};
use crate::domain::ports::ServiceDirectory;
use crate::utils::error::Result;
use std::collections::{HashMap, HashSet};

/// Namespace name → id, built from one full listing per invocation.
///
/// The listing is unfiltered, which assumes an account holds a modest number
/// of namespaces (around a hundred).
#[derive(Debug)]
pub struct NamespaceIndex {
    ids: HashMap<String, String>,
}

impl NamespaceIndex {
    pub async fn load<D: ServiceDirectory + ?Sized>(directory: &D) -> Result<Self> {
        let namespaces = directory.list_namespaces().await?;
        tracing::debug!("Listed {} namespaces", namespaces.len());

        let ids = namespaces
            .into_iter()
            .map(|namespace| (namespace.name, namespace.id))
            .collect();

        Ok(Self { ids })
    }

    pub fn id_of(&self, name: &str) -> Option<&str> {
        self.ids.get(name).map(String::as_str)
    }
}

pub struct ServiceResolver<'a, D: ServiceDirectory + ?Sized> {
    directory: &'a D,
}

impl<'a, D: ServiceDirectory + ?Sized> ServiceResolver<'a, D> {
    pub fn new(directory: &'a D) -> Self {
        Self { directory }
    }

    /// 將宣告對應到實際存在的 Cloud Map service
    ///
    /// Listing failures abort with `SyncError::Lookup`. A declared namespace
    /// that does not exist, or a declared service that is not listed, resolves
    /// to nothing and is reported at warn level.
    pub async fn resolve_services(
        &self,
        declaration: &ServiceDeclaration,
    ) -> Result<Vec<ResolvedService>> {
        if declaration.is_empty() {
            return Ok(Vec::new());
        }

        let index = NamespaceIndex::load(self.directory).await?;
        let mut resolved = Vec::new();

        for (namespace_name, declared) in declaration {
            let Some(namespace_id) = index.id_of(namespace_name) else {
                tracing::warn!(
                    namespace = %namespace_name,
                    services = ?declared,
                    "⚠️ Declared namespace does not exist, skipping its services"
                );
                continue;
            };

            let listed = self.directory.list_services(namespace_id).await?;
            let wanted: HashSet<&str> = declared.iter().map(String::as_str).collect();
            let mut matched: HashSet<&str> = HashSet::new();

            for service in &listed {
                if wanted.contains(service.name.as_str()) {
                    matched.insert(service.name.as_str());
                    resolved.push(ResolvedService {
                        id: service.id.clone(),
                        name: service.name.clone(),
                        namespace_name: namespace_name.clone(),
                    });
                }
            }

            let unmatched: Vec<&str> = wanted.difference(&matched).copied().collect();
            if !unmatched.is_empty() {
                tracing::warn!(
                    namespace = %namespace_name,
                    namespace_id = %namespace_id,
                    unmatched = ?unmatched,
                    "⚠️ Declared services not found in namespace"
                );
            }
        }

        tracing::info!("Resolved {} services from {} namespaces", resolved.len(), declaration.len());
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fixture::{FixtureBackend, FixtureNamespace, FixtureService, FixtureSet};
    use crate::domain::model::ServiceDeclaration;
    use crate::utils::error::SyncError;

    fn backend() -> FixtureBackend {
        FixtureBackend::new(FixtureSet {
            namespaces: vec![
                FixtureNamespace {
                    id: "ns-1".to_string(),
                    name: "web".to_string(),
                    services: vec![
                        FixtureService::new("svc-1", "api"),
                        FixtureService::new("svc-2", "other"),
                        FixtureService::new("svc-3", "edge"),
                    ],
                },
                FixtureNamespace {
                    id: "ns-2".to_string(),
                    name: "internal".to_string(),
                    services: vec![FixtureService::new("svc-4", "db")],
                },
            ],
            ..Default::default()
        })
    }

    fn declaration(entries: &[(&str, &[&str])]) -> ServiceDeclaration {
        entries
            .iter()
            .map(|(ns, names)| (ns.to_string(), names.iter().map(|n| n.to_string()).collect()))
            .collect()
    }

    fn ids(services: &[ResolvedService]) -> HashSet<String> {
        services.iter().map(|s| s.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_partial_overlap_resolves_exact_subset() {
        let backend = backend();
        let resolver = ServiceResolver::new(&backend);

        let resolved = resolver
            .resolve_services(&declaration(&[("web", &["edge", "api", "missing"])]))
            .await
            .unwrap();

        let expected: HashSet<String> = ["svc-1", "svc-3"].iter().map(|s| s.to_string()).collect();
        assert_eq!(ids(&resolved), expected);
        assert!(resolved.iter().all(|s| s.namespace_name == "web"));
    }

    #[tokio::test]
    async fn test_missing_namespace_resolves_to_nothing() {
        let backend = backend();
        let resolver = ServiceResolver::new(&backend);

        let resolved = resolver
            .resolve_services(&declaration(&[("nowhere", &["api"]), ("internal", &["db"])]))
            .await
            .unwrap();

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, "svc-4");
        assert_eq!(resolved[0].namespace_name, "internal");
    }

    #[tokio::test]
    async fn test_name_match_is_case_sensitive() {
        let backend = backend();
        let resolver = ServiceResolver::new(&backend);

        let resolved = resolver
            .resolve_services(&declaration(&[("web", &["API", "api "])]))
            .await
            .unwrap();

        assert!(resolved.is_empty());
    }

    #[tokio::test]
    async fn test_empty_declaration_makes_no_calls() {
        let backend = backend();
        let resolver = ServiceResolver::new(&backend);

        let resolved = resolver.resolve_services(&ServiceDeclaration::new()).await.unwrap();

        assert!(resolved.is_empty());
        assert!(backend.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_namespace_listing_failure_aborts() {
        let backend = backend();
        backend.fail_namespace_listing().await;
        let resolver = ServiceResolver::new(&backend);

        let err = resolver
            .resolve_services(&declaration(&[("web", &["api"])]))
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Lookup { .. }));
    }

    #[tokio::test]
    async fn test_service_listing_failure_aborts() {
        let backend = backend();
        backend.fail_service_listing("ns-2").await;
        let resolver = ServiceResolver::new(&backend);

        let err = resolver
            .resolve_services(&declaration(&[("web", &["api"]), ("internal", &["db"])]))
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Lookup { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_declared_names_resolve_once() {
        let backend = backend();
        let resolver = ServiceResolver::new(&backend);

        let resolved = resolver
            .resolve_services(&declaration(&[("web", &["api", "api"])]))
            .await
            .unwrap();

        assert_eq!(resolved.len(), 1);
    }
}
