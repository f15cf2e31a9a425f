use crate::{
    data::student::{Student, UpdateStudent},
    error::RosterResult,
    store::{Filter, StudentStore},
};
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Document {
    key: Uuid,
    student: Student,
}

impl Document {
    fn matches(&self, filter: Filter<'_>) -> bool {
        match filter {
            Filter::Id(id) => self.student.id == id,
            Filter::InternalKey(key) => self.key == key,
        }
    }
}

/// In-process store, documents are kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStudentStore {
    documents: RwLock<Vec<Document>>,
}

#[async_trait]
impl StudentStore for MemoryStudentStore {
    async fn insert_one(&self, student: &Student) -> RosterResult<Uuid> {
        let key = Uuid::new_v4();
        self.documents.write().await.push(Document {
            key,
            student: student.clone(),
        });
        Ok(key)
    }

    async fn find_one(&self, filter: Filter<'_>) -> RosterResult<Option<Student>> {
        Ok(self
            .documents
            .read()
            .await
            .iter()
            .find(|document| document.matches(filter))
            .map(|document| document.student.clone()))
    }

    async fn find_many(&self, limit: usize) -> RosterResult<Vec<Student>> {
        Ok(self
            .documents
            .read()
            .await
            .iter()
            .take(limit)
            .map(|document| document.student.clone())
            .collect())
    }

    async fn update_one(&self, id: &str, changes: &UpdateStudent) -> RosterResult<u64> {
        let mut documents = self.documents.write().await;
        let Some(document) = documents
            .iter_mut()
            .find(|document| document.matches(Filter::Id(id)))
        else {
            return Ok(0);
        };

        Ok(u64::from(document.student.apply(changes)))
    }

    async fn delete_one(&self, id: &str) -> RosterResult<u64> {
        let mut documents = self.documents.write().await;
        let Some(index) = documents
            .iter()
            .position(|document| document.matches(Filter::Id(id)))
        else {
            return Ok(0);
        };

        documents.remove(index);
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::student::generate_id;

    fn student(name: &str) -> Student {
        Student {
            id: generate_id(),
            name: name.into(),
            email: format!("{name}@example.com"),
            course: "Physics".into(),
            gpa: 3.0,
        }
    }

    #[tokio::test]
    async fn finds_by_either_key() {
        let store = MemoryStudentStore::default();
        let alice = student("alice");
        let key = store.insert_one(&alice).await.unwrap();

        assert_eq!(store.find_one(Filter::InternalKey(key)).await.unwrap(), Some(alice.clone()));
        assert_eq!(store.find_one(Filter::Id(&alice.id)).await.unwrap(), Some(alice.clone()));
        assert_eq!(store.find_one(Filter::Id(&key.to_string())).await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_counts_only_real_modifications() {
        let store = MemoryStudentStore::default();
        let alice = student("alice");
        store.insert_one(&alice).await.unwrap();

        let same_gpa = UpdateStudent {
            gpa: Some(3.0),
            ..UpdateStudent::default()
        };
        assert_eq!(store.update_one(&alice.id, &same_gpa).await.unwrap(), 0);

        let new_gpa = UpdateStudent {
            gpa: Some(3.5),
            ..UpdateStudent::default()
        };
        assert_eq!(store.update_one(&alice.id, &new_gpa).await.unwrap(), 1);
        assert_eq!(store.update_one("missing", &new_gpa).await.unwrap(), 0);

        let stored = store.find_one(Filter::Id(&alice.id)).await.unwrap().unwrap();
        assert_eq!(stored.gpa, 3.5);
    }

    #[tokio::test]
    async fn find_many_keeps_insertion_order_and_limit() {
        let store = MemoryStudentStore::default();
        for name in ["a", "b", "c"] {
            store.insert_one(&student(name)).await.unwrap();
        }

        let names: Vec<_> = store
            .find_many(2)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[tokio::test]
    async fn delete_removes_exactly_one() {
        let store = MemoryStudentStore::default();
        let alice = student("alice");
        let bob = student("bob");
        store.insert_one(&alice).await.unwrap();
        store.insert_one(&bob).await.unwrap();

        assert_eq!(store.delete_one(&alice.id).await.unwrap(), 1);
        assert_eq!(store.delete_one(&alice.id).await.unwrap(), 0);
        assert_eq!(store.find_many(10).await.unwrap(), vec![bob]);
    }
}
