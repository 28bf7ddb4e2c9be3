use crate::domain::model::{NewStudent, Student, StudentId};
use crate::domain::ports::StudentDirectory;
use crate::utils::error::{EnrollError, Result};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct StudentTable {
    rows: Vec<Student>,
    by_identification: HashMap<String, StudentId>,
}

impl StudentTable {
    fn row(&self, id: StudentId) -> Option<&Student> {
        let index = usize::try_from(id.checked_sub(1)?).ok()?;
        self.rows.get(index)
    }
}

/// Thread-safe student directory. Ids are assigned sequentially from 1.
#[derive(Debug, Default)]
pub struct InMemoryStudentDirectory {
    table: RwLock<StudentTable>,
}

impl InMemoryStudentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn count(&self) -> usize {
        self.table.read().rows.len()
    }
}

impl StudentDirectory for InMemoryStudentDirectory {
    fn create(&self, student: NewStudent) -> Result<Student> {
        let student = student.normalized()?;
        let mut table = self.table.write();

        if table.by_identification.contains_key(&student.identification) {
            return Err(EnrollError::DuplicateKey {
                entity: "Student",
                key: student.identification,
            });
        }

        let id = table.rows.len() as StudentId + 1;
        let created = Student {
            id,
            identification: student.identification,
            name: student.name,
            program: student.program,
            email: student.email,
            created_at: Utc::now(),
        };
        table
            .by_identification
            .insert(created.identification.clone(), id);
        table.rows.push(created.clone());
        Ok(created)
    }

    fn get(&self, id: StudentId) -> Result<Student> {
        self.table
            .read()
            .row(id)
            .cloned()
            .ok_or_else(|| EnrollError::StudentNotFound {
                student: id.to_string(),
            })
    }

    fn get_by_identification(&self, identification: &str) -> Result<Student> {
        let table = self.table.read();
        table
            .by_identification
            .get(identification.trim())
            .and_then(|id| table.row(*id))
            .cloned()
            .ok_or_else(|| EnrollError::StudentNotFound {
                student: format!("identification {}", identification.trim()),
            })
    }

    fn list(&self) -> Result<Vec<Student>> {
        Ok(self.table.read().rows.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ana() -> NewStudent {
        NewStudent::new(
            "Ana Sofia Rodriguez",
            "55667788",
            "Systems Engineering",
            Some("ana.rodriguez@university.edu"),
        )
    }

    #[test]
    fn test_create_assigns_sequential_ids() {
        let directory = InMemoryStudentDirectory::new();
        let first = directory.create(ana()).unwrap();
        let second = directory
            .create(NewStudent::new("Carlos Lopez", "11223344", "Business", None))
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(directory.count(), 2);
    }

    #[test]
    fn test_duplicate_identification_rejected() {
        let directory = InMemoryStudentDirectory::new();
        directory.create(ana()).unwrap();

        let mut again = ana();
        again.identification = " 55667788 ".to_string();
        match directory.create(again) {
            Err(EnrollError::DuplicateKey { entity, key }) => {
                assert_eq!(entity, "Student");
                assert_eq!(key, "55667788");
            }
            other => panic!("expected duplicate key, got {:?}", other),
        }
        assert_eq!(directory.count(), 1);
    }

    #[test]
    fn test_lookups() {
        let directory = InMemoryStudentDirectory::new();
        let created = directory.create(ana()).unwrap();

        assert_eq!(directory.get(created.id).unwrap(), created);
        assert_eq!(directory.get_by_identification("55667788").unwrap(), created);
        assert!(matches!(
            directory.get(0),
            Err(EnrollError::StudentNotFound { .. })
        ));
        assert!(matches!(
            directory.get(7),
            Err(EnrollError::StudentNotFound { .. })
        ));
        assert!(directory.get_by_identification("00000000").is_err());
    }

    #[test]
    fn test_list_in_creation_order() {
        let directory = InMemoryStudentDirectory::new();
        directory.create(ana()).unwrap();
        directory
            .create(NewStudent::new("Maria Garcia", "87654321", "Industrial", None))
            .unwrap();

        let names: Vec<String> = directory.list().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Ana Sofia Rodriguez", "Maria Garcia"]);
    }
}
