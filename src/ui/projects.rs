#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectId {
    Phantom,
    IpChanger,
    FastEditor,
    FileManager,
}

impl ProjectId {
    pub const ALL: [ProjectId; 4] = [
        Self::Phantom,
        Self::IpChanger,
        Self::FastEditor,
        Self::FileManager,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Phantom => "phantom",
            Self::IpChanger => "ipchanger",
            Self::FastEditor => "fasteditor",
            Self::FileManager => "filemanager",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "phantom" => Some(Self::Phantom),
            "ipchanger" => Some(Self::IpChanger),
            "fasteditor" => Some(Self::FastEditor),
            "filemanager" => Some(Self::FileManager),
            _ => None,
        }
    }

    /// DOM id of the detail modal for this project.
    pub fn modal_element_id(self) -> String {
        format!("{}Modal", self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ProjectCategory {
    #[default]
    All,
    Security,
    Networking,
    Tools,
}

impl ProjectCategory {
    pub const ALL: [ProjectCategory; 4] = [Self::All, Self::Security, Self::Networking, Self::Tools];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Security => "security",
            Self::Networking => "networking",
            Self::Tools => "tools",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            "security" => Some(Self::Security),
            "networking" => Some(Self::Networking),
            "tools" => Some(Self::Tools),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Security => "Security",
            Self::Networking => "Networking",
            Self::Tools => "Tools",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Project {
    pub id: ProjectId,
    pub category: ProjectCategory,
    pub title: &'static str,
    pub summary: &'static str,
    pub details: &'static str,
    pub stack: &'static [&'static str],
}

impl Project {
    pub fn is_visible(&self, filter: ProjectCategory) -> bool {
        filter == ProjectCategory::All || self.category == filter
    }
}

pub const PROJECTS: [Project; 4] = [
    Project {
        id: ProjectId::Phantom,
        category: ProjectCategory::Security,
        title: "Phantom",
        summary: "Privacy toolkit that scrubs traces and hardens a Linux workstation.",
        details: "Automates log cleanup, MAC randomisation and service hardening behind a single terminal menu.",
        stack: &["Python", "Bash", "Linux"],
    },
    Project {
        id: ProjectId::IpChanger,
        category: ProjectCategory::Networking,
        title: "IP Changer",
        summary: "Rotates the outbound address through Tor on a fixed interval.",
        details: "Drives the Tor control port, verifies the new exit address and reports each rotation.",
        stack: &["Python", "Tor", "Requests"],
    },
    Project {
        id: ProjectId::FastEditor,
        category: ProjectCategory::Tools,
        title: "Fast Editor",
        summary: "Minimal keyboard-driven text editor for quick config edits.",
        details: "Syntax highlighting, search and replace and instant startup for editing files over SSH.",
        stack: &["Python", "Curses"],
    },
    Project {
        id: ProjectId::FileManager,
        category: ProjectCategory::Tools,
        title: "File Manager",
        summary: "Terminal file manager with previews and bulk operations.",
        details: "Two-pane navigation, batch rename and archive handling without leaving the shell.",
        stack: &["Python", "Curses", "Linux"],
    },
];

pub fn visible_projects(filter: ProjectCategory) -> impl Iterator<Item = &'static Project> {
    PROJECTS.iter().filter(move |project| project.is_visible(filter))
}

pub fn project(id: ProjectId) -> &'static Project {
    match id {
        ProjectId::Phantom => &PROJECTS[0],
        ProjectId::IpChanger => &PROJECTS[1],
        ProjectId::FastEditor => &PROJECTS[2],
        ProjectId::FileManager => &PROJECTS[3],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_id_parses_back_from_its_name() {
        for id in ProjectId::ALL {
            assert_eq!(ProjectId::from_str(id.as_str()), Some(id));
            assert_eq!(project(id).id, id);
        }
        assert_eq!(ProjectId::from_str("unknown"), None);
    }

    #[test]
    fn all_filter_shows_every_project() {
        assert_eq!(visible_projects(ProjectCategory::All).count(), PROJECTS.len());
    }

    #[test]
    fn category_filter_only_shows_matching_projects() {
        let tools: Vec<_> = visible_projects(ProjectCategory::Tools).map(|p| p.id).collect();
        assert_eq!(tools, vec![ProjectId::FastEditor, ProjectId::FileManager]);
    }

    #[test]
    fn modal_element_id_matches_markup_convention() {
        assert_eq!(ProjectId::IpChanger.modal_element_id(), "ipchangerModal");
    }
}
