use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Target inventory for ansible runs. Host/group contents are opaque to the
/// dispatch core; only identity and variables are needed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    pub id: Uuid,
    pub name: String,
    pub variables: HashMap<String, String>,
    pub hosts: HashSet<Uuid>,
    pub groups: HashSet<Uuid>,
}

impl Inventory {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            variables: HashMap::new(),
            hosts: HashSet::new(),
            groups: HashSet::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Host {
    pub id: Uuid,
    pub name: String,
    pub variables: HashMap<String, String>,
}

impl Host {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            variables: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub hosts: HashSet<Uuid>,
    pub variables: HashMap<String, String>,
}

impl Group {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            hosts: HashSet::new(),
            variables: HashMap::new(),
        }
    }
}
