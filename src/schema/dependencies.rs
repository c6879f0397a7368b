use super::tables::{get_table, ALL_TABLES};
use super::types::TableSchema;
use std::collections::{HashMap, HashSet, VecDeque};

/// Resolves table dependencies for filtering
pub struct DependencyResolver {
    /// Map of table name -> tables it depends on
    deps: HashMap<&'static str, HashSet<&'static str>>,
    /// Map of table name -> tables that depend on it
    reverse_deps: HashMap<&'static str, HashSet<&'static str>>,
}

impl DependencyResolver {
    pub fn new() -> Self {
        let mut deps: HashMap<&'static str, HashSet<&'static str>> = HashMap::new();
        let mut reverse_deps: HashMap<&'static str, HashSet<&'static str>> = HashMap::new();

        for table in ALL_TABLES {
            let table_deps = table.dependencies();
            deps.insert(table.name, table_deps.clone());

            for dep in table_deps {
                reverse_deps.entry(dep).or_default().insert(table.name);
            }
        }

        Self { deps, reverse_deps }
    }

    /// Requested tables plus every table they depend on, parents first
    pub fn resolve_includes(
        &self,
        requested: &[&str],
    ) -> Result<Vec<&'static TableSchema>, String> {
        let included = self.closure(requested, &self.deps)?;
        self.topological_sort(&included)
    }

    /// All tables except the excluded ones and everything depending on them
    pub fn resolve_excludes(&self, excluded: &[&str]) -> Result<Vec<&'static TableSchema>, String> {
        let removed = self.closure(excluded, &self.reverse_deps)?;
        let included: HashSet<&str> = ALL_TABLES
            .iter()
            .map(|t| t.name)
            .filter(|name| !removed.contains(name))
            .collect();

        self.topological_sort(&included)
    }

    /// Return all tables in dependency order
    pub fn all_tables_ordered(&self) -> Vec<&'static TableSchema> {
        ALL_TABLES.to_vec()
    }

    /// Walk `edges` from the named tables, validating each name
    fn closure(
        &self,
        start: &[&str],
        edges: &HashMap<&'static str, HashSet<&'static str>>,
    ) -> Result<HashSet<&'static str>, String> {
        let mut reached: HashSet<&'static str> = HashSet::new();
        let mut queue: VecDeque<&'static str> = VecDeque::new();

        for name in start {
            let table = get_table(name).ok_or_else(|| format!("Unknown table: {}", name))?;
            queue.push_back(table.name);
        }

        while let Some(table_name) = queue.pop_front() {
            if !reached.insert(table_name) {
                continue;
            }

            if let Some(next) = edges.get(table_name) {
                for name in next {
                    if !reached.contains(name) {
                        queue.push_back(*name);
                    }
                }
            }
        }

        Ok(reached)
    }

    /// Topological sort of tables by dependencies
    fn topological_sort(
        &self,
        included: &HashSet<&str>,
    ) -> Result<Vec<&'static TableSchema>, String> {
        let mut result = Vec::new();
        let mut visited: HashSet<&'static str> = HashSet::new();
        let mut temp_visited: HashSet<&'static str> = HashSet::new();

        // Iterate in catalogue order so the output is stable
        for table in ALL_TABLES {
            if included.contains(table.name) && !visited.contains(table.name) {
                self.visit(
                    table.name,
                    included,
                    &mut visited,
                    &mut temp_visited,
                    &mut result,
                )?;
            }
        }

        Ok(result)
    }

    fn visit(
        &self,
        name: &'static str,
        included: &HashSet<&str>,
        visited: &mut HashSet<&'static str>,
        temp_visited: &mut HashSet<&'static str>,
        result: &mut Vec<&'static TableSchema>,
    ) -> Result<(), String> {
        if temp_visited.contains(name) {
            return Err(format!("Circular dependency detected at: {}", name));
        }
        if visited.contains(name) {
            return Ok(());
        }

        temp_visited.insert(name);

        if let Some(deps) = self.deps.get(name) {
            for dep in deps {
                if *dep != name && included.contains(dep) {
                    self.visit(*dep, included, visited, temp_visited, result)?;
                }
            }
        }

        temp_visited.remove(name);
        visited.insert(name);

        if let Some(table) = get_table(name) {
            result.push(table);
        }

        Ok(())
    }
}

impl Default for DependencyResolver {
    fn default() -> Self {
        Self::new()
    }
}
