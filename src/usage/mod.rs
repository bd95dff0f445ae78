/*!
Usage renderer.

Reads the catalog only. Two outputs:

  render_usage(catalog, &UsageOptions) -> String   human help screen
  render_json(catalog)                 -> Value    machine-readable dump

Human layout (commands sorted by name, descriptions in a second column):

  calc 0.1.0
  Demo calculator

  commands:
    add                              Add numbers together
      usage:
        add <num1> <num2> [options]  Add two numbers
        add <items>... [options]     Sum any number of values
      options:
        --precision=<usize>, -p      Digits after the decimal point
*/

pub mod format;

pub use format::{UsageOptions, color, display_width, strip_ansi, two_column, wrap_text};

use format::Role;
use serde_json::{Value, json};

use crate::engine::catalog::{Catalog, CommandDescriptor, OperationDescriptor, OptionDescriptor};

const TITLE_INDENT: &str = "  ";
const SECTION_INDENT: &str = "    ";
const ROW_INDENT: &str = "      ";
const GAP: usize = 2;

/* ---- Rows ---- */

/// One left-column entry, kept in plain and styled form so padding can be
/// computed on the plain width.
struct Row {
    plain: String,
    styled: String,
    help: Option<String>,
}

impl Row {
    fn new(indent: &str) -> Self {
        Row {
            plain: indent.to_string(),
            styled: indent.to_string(),
            help: None,
        }
    }

    fn push(&mut self, text: &str, role: Option<Role>, options: &UsageOptions) -> &mut Self {
        self.plain.push_str(text);
        match role {
            Some(role) => self.styled.push_str(&color(role, text, options)),
            None => self.styled.push_str(text),
        }
        self
    }

    fn help(mut self, help: Option<&str>) -> Self {
        self.help = help.map(str::to_string);
        self
    }
}

struct Block {
    title: Row,
    usage: Vec<Row>,
    options: Vec<Row>,
}

fn usage_row(command: &CommandDescriptor, op: &OperationDescriptor, options: &UsageOptions) -> Row {
    let mut row = Row::new(ROW_INDENT);
    row.push(command.name(), Some(Role::Primary), options);
    for param in op.params() {
        let placeholder = if op.is_sequence() {
            format!(" <{}>...", param.name)
        } else {
            format!(" <{}>", param.name)
        };
        row.push(&placeholder, Some(Role::Accent), options);
    }
    if !command.options().is_empty() {
        row.push(" [options]", Some(Role::Dim), options);
    }
    row.help(op.description())
}

fn option_row(option: &OptionDescriptor, options: &UsageOptions) -> Row {
    let mut row = Row::new(ROW_INDENT);
    row.push(&format!("--{}", option.name()), Some(Role::Primary), options);
    if option.kind().requires_value() {
        row.push(&format!("=<{}>", option.value_type()), Some(Role::Accent), options);
    }
    if let Some(letter) = option.abbreviation() {
        row.push(", ", None, options)
            .push(&format!("-{letter}"), Some(Role::Primary), options);
    }
    row.help(option.description())
}

fn command_block(command: &CommandDescriptor, options: &UsageOptions) -> Block {
    let mut title = Row::new(TITLE_INDENT);
    title.push(command.name(), Some(Role::Bold), options);
    Block {
        title: title.help(command.description()),
        usage: command
            .operations()
            .iter()
            .map(|op| usage_row(command, op, options))
            .collect(),
        options: command
            .options()
            .iter()
            .map(|o| option_row(o, options))
            .collect(),
    }
}

/// Column where descriptions start: widest left entry plus a gap, at most
/// half the line when wrapping is on.
fn description_column(blocks: &[Block], options: &UsageOptions) -> usize {
    let widest = blocks
        .iter()
        .flat_map(|b| std::iter::once(&b.title).chain(&b.usage).chain(&b.options))
        .map(|r| display_width(&r.plain))
        .max()
        .unwrap_or(0);
    let column = widest + GAP;
    if options.max_width == 0 {
        column
    } else {
        column.min(options.max_width / 2)
    }
}

fn render_row(out: &mut Vec<String>, row: &Row, column: usize, options: &UsageOptions) {
    out.extend(two_column(&row.styled, row.help.as_deref(), column, options));
}

/* ---- Public API ---- */

/// Human-readable help for every command in `catalog`.
pub fn render_usage(catalog: &Catalog, options: &UsageOptions) -> String {
    let mut out: Vec<String> = Vec::new();

    let mut header = color(Role::Bold, &options.program_name, options);
    if let Some(version) = &options.version {
        header.push(' ');
        header.push_str(&color(Role::Secondary, version, options));
    }
    out.push(header);
    if let Some(description) = &options.description {
        out.extend(wrap_text(description, options.max_width));
    }
    out.push(String::new());

    let mut commands: Vec<&CommandDescriptor> = catalog.list_commands().iter().collect();
    if commands.is_empty() {
        out.push(color(Role::Dim, "no commands registered", options));
        return out.join("\n");
    }
    commands.sort_by_key(|c| c.name().to_ascii_lowercase());

    let blocks: Vec<Block> = commands
        .iter()
        .map(|c| command_block(c, options))
        .collect();
    let column = description_column(&blocks, options);

    out.push(color(Role::Bold, "commands:", options));
    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            out.push(String::new());
        }
        render_row(&mut out, &block.title, column, options);
        if !block.usage.is_empty() {
            out.push(format!("{SECTION_INDENT}{}", color(Role::Dim, "usage:", options)));
            for row in &block.usage {
                render_row(&mut out, row, column, options);
            }
        }
        if !block.options.is_empty() {
            out.push(format!("{SECTION_INDENT}{}", color(Role::Dim, "options:", options)));
            for row in &block.options {
                render_row(&mut out, row, column, options);
            }
        }
    }

    out.join("\n")
}

/// Catalog metadata as JSON (names, descriptions, parameters, options).
pub fn render_json(catalog: &Catalog) -> Value {
    json!({
        "count": catalog.len(),
        "commands": catalog,
    })
}

/* ---- Tests ---- */
