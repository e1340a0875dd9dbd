//! Per-user data shards.
//!
//! Every user's financial records, funds and fund members live on exactly one
//! shard, picked by `uid mod n`. No engine operation opens a transaction on
//! more than one shard.

use sea_orm::DatabaseConnection;

#[derive(Clone, Debug)]
pub struct Shards {
    connections: Vec<DatabaseConnection>,
}

impl Shards {
    /// All users on one connection.
    pub fn single(database: DatabaseConnection) -> Self {
        Self {
            connections: vec![database],
        }
    }

    /// Returns `None` when `connections` is empty.
    pub fn new(connections: Vec<DatabaseConnection>) -> Option<Self> {
        (!connections.is_empty()).then_some(Self { connections })
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// The shard holding `uid`'s data.
    pub fn for_user(&self, uid: i64) -> &DatabaseConnection {
        let index = uid.rem_euclid(self.connections.len() as i64) as usize;
        &self.connections[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_refuses_no_connections() {
        assert!(Shards::new(Vec::new()).is_none());

        let shards = Shards::new(vec![
            DatabaseConnection::Disconnected,
            DatabaseConnection::Disconnected,
        ])
        .unwrap();
        assert_eq!(shards.len(), 2);
        assert_eq!(Shards::single(DatabaseConnection::Disconnected).len(), 1);
    }
}
