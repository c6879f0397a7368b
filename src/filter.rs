use crate::schema::{DependencyResolver, TableSchema};
use anyhow::{anyhow, bail, Result};
use log::info;

/// Resolves which tables to load based on include/exclude filters
pub fn resolve_tables(
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
) -> Result<Vec<&'static TableSchema>> {
    let resolver = DependencyResolver::new();

    let tables = match (include, exclude) {
        (Some(_), Some(_)) => {
            bail!("Cannot use both --include and --exclude at the same time");
        }
        (Some(include_list), None) => {
            let refs: Vec<&str> = include_list.iter().map(|s| s.as_str()).collect();
            info!("Resolving dependencies for: {:?}", refs);
            resolver.resolve_includes(&refs).map_err(|e| anyhow!(e))?
        }
        (None, Some(exclude_list)) => {
            let refs: Vec<&str> = exclude_list.iter().map(|s| s.as_str()).collect();
            info!("Excluding tables: {:?}", refs);
            resolver.resolve_excludes(&refs).map_err(|e| anyhow!(e))?
        }
        (None, None) => resolver.all_tables_ordered(),
    };

    let names: Vec<&str> = tables.iter().map(|t| t.name).collect();
    info!("Including {} tables: {}", tables.len(), names.join(", "));

    Ok(tables)
}
