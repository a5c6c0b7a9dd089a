//! A read-through cache over the record store, scoped to one report run.
//!
//! Reports that annotate rows with names (who wrote this note, which teacher
//! ran this session) tend to ask for the same few records many times. A
//! `Directory` fetches each one at most once and is dropped with the report,
//! so it never serves data older than the run it belongs to.

use std::collections::HashMap;

use presensi_core::{
  journal::JournalEntry,
  roster::{Student, Teacher},
  store::AttendanceStore,
};
use uuid::Uuid;

use crate::{Error, Result};

pub struct Directory<'s, S> {
  store:    &'s S,
  students: HashMap<Uuid, Option<Student>>,
  teachers: HashMap<Uuid, Option<Teacher>>,
  journals: HashMap<Uuid, Option<JournalEntry>>,
}

impl<'s, S: AttendanceStore> Directory<'s, S> {
  pub fn new(store: &'s S) -> Self {
    Self {
      store,
      students: HashMap::new(),
      teachers: HashMap::new(),
      journals: HashMap::new(),
    }
  }

  /// Seed the cache with students that were already fetched.
  pub fn with_students(mut self, students: &[Student]) -> Self {
    for s in students {
      self.students.insert(s.student_id, Some(s.clone()));
    }
    self
  }

  pub async fn student(&mut self, id: Uuid) -> Result<Option<&Student>> {
    if !self.students.contains_key(&id) {
      let found = self.store.get_student(id).await.map_err(Error::store)?;
      self.students.insert(id, found);
    }
    Ok(self.students.get(&id).and_then(Option::as_ref))
  }

  pub async fn teacher(&mut self, id: Uuid) -> Result<Option<&Teacher>> {
    if !self.teachers.contains_key(&id) {
      let found = self.store.get_teacher(id).await.map_err(Error::store)?;
      self.teachers.insert(id, found);
    }
    Ok(self.teachers.get(&id).and_then(Option::as_ref))
  }

  pub async fn journal(&mut self, id: Uuid) -> Result<Option<&JournalEntry>> {
    if !self.journals.contains_key(&id) {
      let found = self.store.get_journal(id).await.map_err(Error::store)?;
      self.journals.insert(id, found);
    }
    Ok(self.journals.get(&id).and_then(Option::as_ref))
  }

  /// Name of the teacher who ran the session `journal_id`.
  pub async fn reporter_of(&mut self, journal_id: Uuid) -> Result<Option<String>> {
    let Some(teacher_id) = self.journal(journal_id).await?.map(|j| j.teacher_id)
    else {
      return Ok(None);
    };
    Ok(self.teacher(teacher_id).await?.map(|t| t.name.clone()))
  }

  /// Resolve reporter names for many sessions. Sessions whose journal or
  /// teacher no longer exists are left out.
  pub async fn reporters(
    &mut self,
    journal_ids: impl IntoIterator<Item = Uuid>,
  ) -> Result<HashMap<Uuid, String>> {
    let mut names = HashMap::new();
    for journal_id in journal_ids {
      if names.contains_key(&journal_id) {
        continue;
      }
      if let Some(name) = self.reporter_of(journal_id).await? {
        names.insert(journal_id, name);
      }
    }
    Ok(names)
  }
}
