use crate::domain::EntityTable;

pub struct CommandDef {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
}

pub static COMMANDS: &[CommandDef] = &[
    CommandDef {
        name: "items",
        aliases: &["it"],
        description: "Show items",
    },
    CommandDef {
        name: "categories",
        aliases: &["cat"],
        description: "Show item categories",
    },
    CommandDef {
        name: "types",
        aliases: &["ty"],
        description: "Show item types",
    },
    CommandDef {
        name: "packages",
        aliases: &["pkg"],
        description: "Show item packages",
    },
    CommandDef {
        name: "suppliers",
        aliases: &["sup"],
        description: "Show suppliers",
    },
    CommandDef {
        name: "compare",
        aliases: &["cmp"],
        description: "Compare two versions in the open history",
    },
    CommandDef {
        name: "single",
        aliases: &["one"],
        description: "Select a single version in the open history",
    },
    CommandDef {
        name: "refresh",
        aliases: &["r"],
        description: "Reload from the store",
    },
    CommandDef {
        name: "quit",
        aliases: &["q"],
        description: "Quit apohist",
    },
    CommandDef {
        name: "help",
        aliases: &["h"],
        description: "Show help",
    },
];

pub fn matching_commands(input: &str) -> Vec<&'static CommandDef> {
    let input_lower = input.to_lowercase();
    COMMANDS
        .iter()
        .filter(|cmd| {
            cmd.name.starts_with(&input_lower)
                || cmd.aliases.iter().any(|a| a.starts_with(&input_lower))
        })
        .collect()
}

/// Exact name or alias lookup.
pub fn find_command(input: &str) -> Option<&'static CommandDef> {
    let input_lower = input.to_lowercase();
    COMMANDS
        .iter()
        .find(|cmd| cmd.name == input_lower || cmd.aliases.contains(&input_lower.as_str()))
}

pub fn table_for_command(name: &str) -> Option<EntityTable> {
    match name {
        "items" => Some(EntityTable::Items),
        "categories" => Some(EntityTable::ItemCategories),
        "types" => Some(EntityTable::ItemTypes),
        "packages" => Some(EntityTable::ItemPackages),
        "suppliers" => Some(EntityTable::Suppliers),
        _ => None,
    }
}
