use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

use crate::error::Error;
use crate::resolve::{normalize_name, ProfileDirectory};
use crate::schemas::{Expense, Member, Profile, Project, Uid};

/// In-memory stand-in for the project/expense data store. Its only
/// contract is handing the core a consistent snapshot; how projects would
/// actually persist is somebody else's problem.
#[derive(Default)]
pub struct AppState {
    projects: RwLock<HashMap<String, Project>>,
    profiles: RwLock<ProfileBook>,
}

#[derive(Clone, Debug, Default)]
pub struct ProfileBook {
    profiles: HashMap<Uid, Profile>,
}

impl ProfileBook {
    pub fn insert(&mut self, profile: Profile) {
        self.profiles.insert(profile.uid.clone(), profile);
    }
}

impl ProfileDirectory for ProfileBook {
    fn find_by_name(&self, name: &str) -> Option<&Profile> {
        let wanted = normalize_name(name);
        self.profiles
            .values()
            .filter(|p| normalize_name(&p.name) == wanted)
            .min_by(|a, b| a.uid.cmp(&b.uid))
    }
}

impl AppState {
    pub fn create_project(
        &self,
        id: String,
        name: String,
        members: Vec<Member>,
    ) -> Result<(), Error> {
        let mut seen = HashSet::new();
        for member in &members {
            member.validate()?;
            if !seen.insert(member.uid.as_str()) {
                return Err(Error::DuplicateMember {
                    uid: member.uid.clone(),
                });
            }
        }

        let mut projects = self.projects.write();
        if projects.contains_key(&id) {
            return Err(Error::ProjectExists { id });
        }
        let mut profiles = self.profiles.write();
        for member in &members {
            profiles.insert(Profile {
                uid: member.uid.clone(),
                name: member.name.clone(),
                email: None,
                avatar_url: None,
            });
        }
        projects.insert(
            id.clone(),
            Project {
                id,
                name,
                members,
                expenses: Vec::new(),
            },
        );
        Ok(())
    }

    pub fn add_member(&self, project_id: &str, member: Member) -> Result<(), Error> {
        member.validate()?;
        let mut projects = self.projects.write();
        let project = projects
            .get_mut(project_id)
            .ok_or_else(|| Error::ProjectNotFound {
                id: project_id.to_string(),
            })?;
        if project.members.iter().any(|m| m.uid == member.uid) {
            return Err(Error::DuplicateMember { uid: member.uid });
        }
        self.profiles.write().insert(Profile {
            uid: member.uid.clone(),
            name: member.name.clone(),
            email: None,
            avatar_url: None,
        });
        project.members.push(member);
        Ok(())
    }

    /// Append a validated expense. The payer must be a current member's
    /// uid: attribution is fixed at creation time, never re-derived from a
    /// display name later.
    pub fn add_expense(&self, project_id: &str, expense: Expense) -> Result<(), Error> {
        expense.validate()?;
        let mut projects = self.projects.write();
        let project = projects
            .get_mut(project_id)
            .ok_or_else(|| Error::ProjectNotFound {
                id: project_id.to_string(),
            })?;
        if !project.members.iter().any(|m| m.uid == expense.payer) {
            return Err(Error::UnknownMember {
                uid: expense.payer,
                project: project_id.to_string(),
            });
        }
        project.expenses.push(expense);
        Ok(())
    }

    /// Consistent snapshot for the calculators: the project plus the
    /// profile directory as of the same moment.
    pub fn snapshot(&self, project_id: &str) -> Result<(Project, ProfileBook), Error> {
        let projects = self.projects.read();
        let project = projects
            .get(project_id)
            .cloned()
            .ok_or_else(|| Error::ProjectNotFound {
                id: project_id.to_string(),
            })?;
        Ok((project, self.profiles.read().clone()))
    }

    pub fn expenses_recent_first(&self, project_id: &str) -> Result<Vec<Expense>, Error> {
        let projects = self.projects.read();
        let project = projects.get(project_id).ok_or_else(|| Error::ProjectNotFound {
            id: project_id.to_string(),
        })?;
        Ok(project.expenses.iter().rev().cloned().collect())
    }
}
