use indexmap::IndexMap;

use crate::searchguard::{
    InternalUser, RoleMappingEntry, SgConfig, SgInternalUsers, SgRole, SgRoles, SgRolesMapping,
};

/// Users, roles and role mappings gathered from all migrators of one run.
///
/// A kind stays `None` until some migrator produced it, so an empty but
/// produced collection is still rendered.
#[derive(Debug, Default)]
pub struct IntermediateRepresentation {
    users: Option<IndexMap<String, InternalUser>>,
    roles: Option<IndexMap<String, SgRole>>,
    role_mappings: Option<IndexMap<String, RoleMappingEntry>>,
}

impl IntermediateRepresentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; returns the replaced user.
    pub fn add_user(
        &mut self,
        name: impl Into<String>,
        user: InternalUser,
    ) -> Option<InternalUser> {
        self.users.get_or_insert_with(IndexMap::new).insert(name.into(), user)
    }

    pub fn add_role(&mut self, name: impl Into<String>, role: SgRole) -> Option<SgRole> {
        self.roles.get_or_insert_with(IndexMap::new).insert(name.into(), role)
    }

    pub fn add_role_mapping(
        &mut self,
        role: impl Into<String>,
        entry: RoleMappingEntry,
    ) -> Option<RoleMappingEntry> {
        self.role_mappings
            .get_or_insert_with(IndexMap::new)
            .insert(role.into(), entry)
    }

    /// Fold a whole artifact in; returns the names that were already present.
    pub fn add_users(&mut self, users: SgInternalUsers) -> Vec<String> {
        self.users.get_or_insert_with(IndexMap::new);
        users
            .users
            .into_iter()
            .filter_map(|(name, user)| self.add_user(name.clone(), user).map(|_| name))
            .collect()
    }

    pub fn add_roles(&mut self, roles: SgRoles) -> Vec<String> {
        self.roles.get_or_insert_with(IndexMap::new);
        roles
            .roles
            .into_iter()
            .filter_map(|(name, role)| self.add_role(name.clone(), role).map(|_| name))
            .collect()
    }

    pub fn add_role_mappings(&mut self, mappings: SgRolesMapping) -> Vec<String> {
        self.role_mappings.get_or_insert_with(IndexMap::new);
        mappings
            .mappings
            .into_iter()
            .filter_map(|(role, entry)| self.add_role_mapping(role.clone(), entry).map(|_| role))
            .collect()
    }

    pub fn users(&self) -> Option<&IndexMap<String, InternalUser>> {
        self.users.as_ref()
    }

    pub fn roles(&self) -> Option<&IndexMap<String, SgRole>> {
        self.roles.as_ref()
    }

    pub fn role_mappings(&self) -> Option<&IndexMap<String, RoleMappingEntry>> {
        self.role_mappings.as_ref()
    }

    /// Target artifacts for every kind that was produced.
    pub fn render(&self) -> Vec<SgConfig> {
        let mut configs = Vec::new();
        if let Some(users) = &self.users {
            configs.push(SgConfig::InternalUsers(SgInternalUsers {
                users: users.clone(),
            }));
        }
        if let Some(roles) = &self.roles {
            configs.push(SgConfig::Roles(SgRoles {
                roles: roles.clone(),
            }));
        }
        if let Some(mappings) = &self.role_mappings {
            configs.push(SgConfig::RolesMapping(SgRolesMapping {
                mappings: mappings.clone(),
            }));
        }
        configs
    }
}
