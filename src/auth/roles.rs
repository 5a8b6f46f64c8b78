use serde::Serialize;

/// The four fixed roles. Ids match the seeded `roles` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Buyer,
    ContentManager,
    Manager,
    Administrator,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Buyer,
        Role::ContentManager,
        Role::Manager,
        Role::Administrator,
    ];

    pub fn from_id(id: i32) -> Option<Role> {
        match id {
            1 => Some(Role::Buyer),
            2 => Some(Role::ContentManager),
            3 => Some(Role::Manager),
            4 => Some(Role::Administrator),
            _ => None,
        }
    }

    pub fn id(self) -> i32 {
        match self {
            Role::Buyer => 1,
            Role::ContentManager => 2,
            Role::Manager => 3,
            Role::Administrator => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Buyer => "Buyer",
            Role::ContentManager => "Content manager",
            Role::Manager => "Manager",
            Role::Administrator => "Administrator",
        }
    }
}

/// Display name for a raw role id, "Unknown" when it is none of the four.
pub fn role_name(id: i32) -> &'static str {
    Role::from_id(id).map(Role::name).unwrap_or("Unknown")
}

/// Gated resources. Each carries an explicit allow-list; there is no
/// inheritance between roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    AdminPanel,
    ManagerPanel,
    ContentPanel,
    UserCabinet,
}

impl Resource {
    pub const ALL: [Resource; 4] = [
        Resource::AdminPanel,
        Resource::ManagerPanel,
        Resource::ContentPanel,
        Resource::UserCabinet,
    ];

    pub fn page(self) -> &'static str {
        match self {
            Resource::AdminPanel => "/admin.html",
            Resource::ManagerPanel => "/manager.html",
            Resource::ContentPanel => "/content-manager.html",
            Resource::UserCabinet => "/user.html",
        }
    }

    pub fn allowed_roles(self) -> &'static [Role] {
        match self {
            Resource::AdminPanel => &[Role::Administrator],
            Resource::ManagerPanel => &[Role::Manager, Role::Administrator],
            Resource::ContentPanel => &[Role::ContentManager, Role::Administrator],
            Resource::UserCabinet => &[Role::Buyer, Role::Manager, Role::Administrator],
        }
    }

    pub fn allows(self, role_id: i32) -> bool {
        self.allowed_roles().iter().any(|r| r.id() == role_id)
    }
}

/// One row of the access table as served to the browser.
#[derive(Debug, Serialize)]
pub struct AccessEntry {
    pub page: &'static str,
    pub roles: Vec<i32>,
}

pub fn access_table() -> Vec<AccessEntry> {
    Resource::ALL
        .iter()
        .map(|r| AccessEntry {
            page: r.page(),
            roles: r.allowed_roles().iter().map(|role| role.id()).collect(),
        })
        .collect()
}
