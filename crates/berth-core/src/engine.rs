use crate::identity::{allocate_id, allocate_name};
use crate::CoreError;
use berth_runtime::{correlate, merge_env, run_ps, validate_env, EnvironmentSet, ProcessTable};
use berth_schema::{
    is_container_id, parse_security_opts, ContainerId, ContainerName, ContainerSpec,
    SecurityProfile,
};
use berth_store::{
    validate_container_name, ContainerMetadata, ContainerStore, MemoryNameIndex, MetadataStore,
    NameIndex, StoreError, StoreLayout,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where [`Engine::top`] gets its process listing from.
#[derive(Debug, Clone, Copy)]
pub enum PsListing<'a> {
    /// Output already captured by the caller.
    Captured(&'a [u8]),
    /// Run the host `ps` with these arguments.
    Run(&'a [String]),
}

/// Orchestrates container identity and configuration on top of a store.
///
/// The engine owns the persistent metadata and shares the name index with
/// whoever else needs it (a rename path, for instance). It is `Sync`, so
/// concurrent creations can run against one instance.
pub struct Engine {
    layout: StoreLayout,
    meta_store: MetadataStore,
    names: Arc<dyn NameIndex>,
}

impl Engine {
    /// Open the store at `store_root` with a fresh in-memory name index
    /// populated from persisted metadata.
    pub fn open(store_root: impl Into<PathBuf>) -> Result<Self, CoreError> {
        Self::with_name_index(store_root, Arc::new(MemoryNameIndex::new()))
    }

    /// Open the store and register every persisted container in `names`.
    pub fn with_name_index(
        store_root: impl Into<PathBuf>,
        names: Arc<dyn NameIndex>,
    ) -> Result<Self, CoreError> {
        let layout = StoreLayout::new(store_root.into());
        layout.initialize()?;
        let meta_store = MetadataStore::new(layout.clone());

        let existing = meta_store.list()?;
        for meta in &existing {
            if let Err(e) = names.bind(&meta.name, &meta.id) {
                warn!("container {} keeps no short name: {e}", meta.id);
            }
        }
        debug!(
            "opened store at {} with {} containers",
            layout.root().display(),
            existing.len()
        );

        Ok(Self {
            layout,
            meta_store,
            names,
        })
    }

    pub fn store_layout(&self) -> &StoreLayout {
        &self.layout
    }

    pub fn name_index(&self) -> &Arc<dyn NameIndex> {
        &self.names
    }

    /// Create a container record from `spec`.
    ///
    /// Security options and environment entries are validated before any
    /// identity is allocated, so a rejected spec leaves no trace. Bare `KEY`
    /// entries are kept as bare entries.
    pub fn create(&self, spec: &ContainerSpec) -> Result<ContainerMetadata, CoreError> {
        spec.validate()?;

        let mut security = SecurityProfile::default();
        parse_security_opts(&mut security, &spec.security_opt)?;
        validate_env(&spec.env)?;
        let env = EnvironmentSet::from_entries(&spec.env).to_vec();
        if let Some(ref requested) = spec.name {
            validate_container_name(requested)?;
        }

        let id = allocate_id(&self.meta_store)?;
        let name = self.bind_name(&id, spec.name.as_deref())?;

        let mut meta = ContainerMetadata::new(id, name, spec.image.clone());
        meta.env = env;
        meta.security = security;

        if let Err(e) = self.meta_store.put(&meta) {
            if let Err(unbind) = self.names.remove(&meta.name) {
                warn!("failed to release name '{}': {unbind}", meta.name);
            }
            return Err(e.into());
        }

        info!("created container {} as '{}'", meta.id, meta.name);
        Ok(meta)
    }

    /// Bind the requested name, or search for a free short name and bind it.
    ///
    /// Searching and binding are separate steps; when another creator binds
    /// the name in between, the search restarts from the same ID.
    fn bind_name(
        &self,
        id: &ContainerId,
        requested: Option<&str>,
    ) -> Result<ContainerName, CoreError> {
        if let Some(name) = requested {
            return match self.names.bind(name, id) {
                Ok(()) => Ok(ContainerName::new(name)),
                Err(StoreError::NameConflict { name, existing_id }) => {
                    Err(CoreError::NameInUse { name, existing_id })
                }
                Err(e) => Err(e.into()),
            };
        }

        loop {
            let Some(name) = allocate_name(self.names.as_ref(), id)? else {
                self.names.bind(id, id)?;
                return Ok(ContainerName::new(id.as_str()));
            };
            match self.names.bind(&name, id) {
                Ok(()) => return Ok(name),
                Err(StoreError::NameConflict { existing_id, .. }) => {
                    debug!("name '{name}' was taken by {existing_id}, searching again");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Resolve a full ID, a name, or a unique ID prefix to a container ID.
    pub fn resolve(&self, reference: &str) -> Result<ContainerId, CoreError> {
        if reference.is_empty() {
            return Err(CoreError::ContainerNotFound(String::new()));
        }
        if is_container_id(reference) && self.meta_store.exists(reference)? {
            return Ok(ContainerId::new(reference));
        }
        if let Some(id) = self.names.get(reference)? {
            return Ok(id);
        }

        let matches: Vec<ContainerId> = self
            .meta_store
            .list()?
            .into_iter()
            .filter(|m| m.id.starts_with(reference))
            .map(|m| m.id)
            .collect();
        match matches.as_slice() {
            [] => Err(CoreError::ContainerNotFound(reference.to_owned())),
            [only] => Ok(only.clone()),
            many => Err(CoreError::AmbiguousReference {
                reference: reference.to_owned(),
                count: many.len(),
            }),
        }
    }

    pub fn inspect(&self, reference: &str) -> Result<ContainerMetadata, CoreError> {
        let id = self.resolve(reference)?;
        match self.meta_store.get(&id) {
            Err(StoreError::ContainerNotFound(_)) => {
                Err(CoreError::ContainerNotFound(reference.to_owned()))
            }
            other => Ok(other?),
        }
    }

    pub fn list(&self) -> Result<Vec<ContainerMetadata>, CoreError> {
        Ok(self.meta_store.list()?)
    }

    /// Delete a container's metadata and release its name.
    pub fn remove(&self, reference: &str) -> Result<ContainerMetadata, CoreError> {
        let meta = self.inspect(reference)?;
        self.meta_store.remove(&meta.id)?;
        if self.names.get(&meta.name)?.as_ref() == Some(&meta.id) {
            self.names.remove(&meta.name)?;
        }
        info!("removed container {} ('{}')", meta.id, meta.name);
        Ok(meta)
    }

    /// Apply environment override directives to a container's stored env.
    pub fn update_env<S: AsRef<str>>(
        &self,
        reference: &str,
        overrides: &[S],
    ) -> Result<ContainerMetadata, CoreError> {
        let mut meta = self.inspect(reference)?;
        let merged = merge_env(overrides, &meta.env)?;
        meta.env = merged.to_vec();
        meta.touch();
        self.meta_store.put(&meta)?;
        info!(
            "updated environment of {} ({} entries)",
            meta.id,
            meta.env.len()
        );
        Ok(meta)
    }

    /// Apply security option directives to a container's stored profile.
    pub fn update_security<S: AsRef<str>>(
        &self,
        reference: &str,
        options: &[S],
    ) -> Result<ContainerMetadata, CoreError> {
        let mut meta = self.inspect(reference)?;
        parse_security_opts(&mut meta.security, options)?;
        meta.touch();
        self.meta_store.put(&meta)?;
        info!("updated security profile of {}", meta.id);
        Ok(meta)
    }

    /// List the processes `pids` of a container.
    ///
    /// The PIDs come from whatever supervises the container; this only
    /// checks the container exists and narrows the listing to them.
    pub fn top(
        &self,
        reference: &str,
        pids: &[i32],
        listing: PsListing<'_>,
    ) -> Result<ProcessTable, CoreError> {
        let id = self.resolve(reference)?;
        let table = match listing {
            PsListing::Captured(raw) => correlate(raw, pids)?,
            PsListing::Run(args) => correlate(&run_ps(args)?, pids)?,
        };
        debug!("{} of {} processes listed for {id}", table.processes.len(), pids.len());
        Ok(table)
    }
}
