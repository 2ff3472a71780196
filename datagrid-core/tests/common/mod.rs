#![allow(dead_code)]

use chrono::NaiveDate;
use datagrid_core::{
    AccessError, Accessors, CellValue, Column, DataTable, Entity, FieldHandlers, MemoryBackend,
    MemoryQuery, Symbolic,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Member,
}

impl Symbolic for Role {
    fn symbol(&self) -> &str {
        match self {
            Role::Admin => "ADMIN",
            Role::Member => "MEMBER",
        }
    }
}

/// Enumeration whose symbols are numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Bronze,
    Gold,
}

impl Symbolic for Tier {
    fn symbol(&self) -> &str {
        match self {
            Tier::Bronze => "1",
            Tier::Gold => "3",
        }
    }
}

/// Nested value without any JSON mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub bio: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub active: bool,
    pub role: Role,
    pub tier: Tier,
    pub joined: NaiveDate,
    pub nickname: Option<String>,
    pub profile: Profile,
}

impl Entity for Account {
    fn table_name() -> &'static str {
        "account"
    }

    fn register_accessors(accessors: &mut Accessors<Self>) {
        accessors
            .register("getId", |a: &Account| a.id)
            .register("getName", |a: &Account| a.name.clone())
            .register("getEmail", |a: &Account| a.email.clone())
            .register("isActive", |a: &Account| a.active)
            .register("getRole", |a: &Account| CellValue::enumeration(&a.role))
            .register("getTier", |a: &Account| CellValue::enumeration(&a.tier))
            .register("getJoined", |a: &Account| a.joined)
            .register("nickname", |a: &Account| a.nickname.clone())
            .register("getProfile", |_: &Account| CellValue::Unsupported)
            .register_fallible("getBroken", |_: &Account| Err(AccessError::new("not loaded")));
    }
}

pub type Query = MemoryQuery<Account>;
pub type Handlers = FieldHandlers<Account, Query>;
pub type Table = DataTable<Account, MemoryBackend<Account>>;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn account(id: i64, name: &str) -> Account {
    Account {
        id,
        name: name.to_string(),
        email: format!("{name}@example.com"),
        active: true,
        role: Role::Member,
        tier: Tier::Bronze,
        joined: date(2024, 1, 1),
        nickname: None,
        profile: Profile {
            bio: String::new(),
        },
    }
}

/// The three-row table `{1,"a"}, {2,"b"}, {3,"c"}`.
pub fn abc() -> Vec<Account> {
    vec![account(1, "a"), account(2, "b"), account(3, "c")]
}

/// Ten accounts with mixed flags, roles and join dates.
pub fn roster() -> Vec<Account> {
    let names = [
        "alice", "bob", "carol", "dave", "erin", "frank", "grace", "heidi", "ivan", "judy",
    ];
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let id = i as i64 + 1;
            let mut a = account(id, name);
            a.active = id % 3 != 0;
            a.role = if id % 4 == 0 { Role::Admin } else { Role::Member };
            a.tier = if id > 5 { Tier::Gold } else { Tier::Bronze };
            a.joined = date(2023, (id as u32 % 12) + 1, 15);
            a
        })
        .collect()
}

/// Columns at positions `0..names.len()`, in order.
pub fn columns(names: &[&str]) -> Vec<Column> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(i as i32, *name))
        .collect()
}

pub fn table(rows: Vec<Account>, handlers: Handlers) -> Table {
    DataTable::new(MemoryBackend::new(rows), handlers)
}

pub fn plain_table(rows: Vec<Account>) -> Table {
    table(rows, Handlers::builder().build())
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
