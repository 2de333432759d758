//! Route storage: create, load, update, and list routes.

use std::{fs, io};

use uuid::Uuid;

use crate::model::Route;

use super::{Result, Storage, StorageError};

impl Storage {
    /// Writes a new route.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::RouteAlreadyExists`] if the id is taken, or an
    /// I/O or JSON error if the record cannot be written.
    pub fn create_route(&self, route: &Route) -> Result<()> {
        let path = self.route_path(route.id);
        if path.exists() {
            return Err(StorageError::RouteAlreadyExists(route.id));
        }
        fs::write(path, serde_json::to_string_pretty(route)?)?;
        Ok(())
    }

    /// Overwrites an existing route.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::RouteNotFound`] if no such route was created,
    /// or an I/O or JSON error if the record cannot be written.
    pub fn update_route(&self, route: &Route) -> Result<()> {
        let path = self.route_path(route.id);
        if !path.exists() {
            return Err(StorageError::RouteNotFound(route.id));
        }
        fs::write(path, serde_json::to_string_pretty(route)?)?;
        Ok(())
    }

    /// Loads a single route.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::RouteNotFound`] for an unknown id,
    /// [`StorageError::Corrupt`] if the file holds a different route, or an
    /// I/O or JSON error if the record cannot be read.
    pub fn load_route(&self, id: Uuid) -> Result<Route> {
        let path = self.route_path(id);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::RouteNotFound(id));
            }
            Err(e) => return Err(e.into()),
        };
        let route: Route = serde_json::from_str(&json)?;
        if route.id != id {
            return Err(StorageError::Corrupt(format!(
                "{} holds route {}",
                path.display(),
                route.id
            )));
        }
        Ok(route)
    }

    /// Lists routes by name. Inactive routes are skipped unless `include_inactive`.
    ///
    /// # Errors
    ///
    /// Returns an I/O or JSON error if a record cannot be read.
    pub fn list_routes(&self, include_inactive: bool) -> Result<Vec<Route>> {
        let mut routes: Vec<Route> = self.load_all("routes")?;
        routes.retain(|r| include_inactive || r.is_active);
        routes.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(routes)
    }
}
