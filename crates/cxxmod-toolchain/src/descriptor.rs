//! Compiler descriptor XML model and parser, grounded on
//! `original_source/src/xml/{parser,handlers,types}.*` (an `expat`-based
//! reader there; `quick-xml`'s event API plays the same role here).

use anyhow::{anyhow, bail, Context, Result};
use cxxmod_model::target::RuleKind;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandVar {
    Input,
    Output,
    MainOutput,
    LinkFlags,
    LinkPath,
    LinkLibrary,
    Defines,
    Cflags,
    Cxxflags,
}

impl CommandVar {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "INPUT" => CommandVar::Input,
            "OUTPUT" => CommandVar::Output,
            "MAIN_OUTPUT" => CommandVar::MainOutput,
            "LINK_FLAGS" => CommandVar::LinkFlags,
            "LINK_PATH" => CommandVar::LinkPath,
            "LINK_LIBRARY" => CommandVar::LinkLibrary,
            "DEFINES" => CommandVar::Defines,
            "CFLAGS" => CommandVar::Cflags,
            "CXXFLAGS" => CommandVar::Cxxflags,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone)]
pub enum TemplatePart {
    Literal(String),
    Var(CommandVar),
    Cxx,
    Tool(String),
}

/// A single command line, composed of literal text, the compiler
/// executable placeholder, an auxiliary tool name, or a templated
/// variable reference.
#[derive(Debug, Clone, Default)]
pub struct CommandTemplate(pub Vec<TemplatePart>);

/// Values substituted into a `CommandTemplate` at render time.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    pub cxx: String,
    pub input: String,
    pub output: String,
    pub main_output: String,
    pub link_flags: String,
    pub link_path: String,
    pub link_library: String,
    pub defines: String,
    pub cflags: String,
    pub cxxflags: String,
    pub tool_paths: BTreeMap<String, String>,
}

impl CommandTemplate {
    pub fn render(&self, ctx: &TemplateContext) -> String {
        let mut out = String::new();
        for part in &self.0 {
            match part {
                TemplatePart::Literal(s) => out.push_str(s),
                TemplatePart::Cxx => out.push_str(&ctx.cxx),
                TemplatePart::Tool(name) => {
                    out.push_str(ctx.tool_paths.get(name).map(String::as_str).unwrap_or(name));
                }
                TemplatePart::Var(v) => out.push_str(match v {
                    CommandVar::Input => &ctx.input,
                    CommandVar::Output => &ctx.output,
                    CommandVar::MainOutput => &ctx.main_output,
                    CommandVar::LinkFlags => &ctx.link_flags,
                    CommandVar::LinkPath => &ctx.link_path,
                    CommandVar::LinkLibrary => &ctx.link_library,
                    CommandVar::Defines => &ctx.defines,
                    CommandVar::Cflags => &ctx.cflags,
                    CommandVar::Cxxflags => &ctx.cxxflags,
                }),
            }
        }
        out
    }
}

#[derive(Debug, Clone, Default)]
pub struct Ident {
    pub compat: String,
    pub exe: String,
    pub name: String,
    pub guard: String,
    pub version: String,
    pub find_tripple: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BmiKind {
    #[default]
    Direct,
    SideEffect,
}

#[derive(Debug, Clone, Default)]
pub struct BmiDecl {
    pub dirname: String,
    pub ext: String,
    pub kind: BmiKind,
    pub supports_partitions: bool,
}

impl BmiDecl {
    pub fn is_standalone(&self) -> bool {
        self.kind == BmiKind::Direct
    }

    /// `<dir>/<module>[<sep><part>]<ext>`; `-` when partitions are
    /// supported, `.` otherwise.
    pub fn bmi_path(&self, module: &str, part: &str) -> String {
        let sep = if self.supports_partitions { '-' } else { '.' };
        if part.is_empty() {
            format!("{}/{module}{}", self.dirname, self.ext)
        } else {
            format!("{}/{module}{sep}{part}{}", self.dirname, self.ext)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone)]
pub struct IncludeDirsRecipe {
    pub output: OutputStream,
    pub start: String,
    pub stop: String,
    pub command: CommandTemplate,
}

#[derive(Debug, Clone)]
pub struct Descriptor {
    pub ident: Ident,
    pub bmi: BmiDecl,
    pub include_dirs: IncludeDirsRecipe,
    pub rules: BTreeMap<RuleKind, Vec<CommandTemplate>>,
}

fn attr(e: &BytesStart, name: &str) -> Option<String> {
    e.attributes().flatten().find_map(|a| {
        if a.key.as_ref() == name.as_bytes() {
            Some(String::from_utf8_lossy(&a.value).into_owned())
        } else {
            None
        }
    })
}

fn rule_kind_from_id(id: &str) -> Option<RuleKind> {
    Some(match id {
        "COMPILE" => RuleKind::Compile,
        "EMIT_BMI" => RuleKind::EmitBmi,
        "EMIT_INCLUDE" => RuleKind::EmitInclude,
        "LINK_STATIC" => RuleKind::LinkStatic,
        "LINK_SO" => RuleKind::LinkSo,
        "LINK_MOD" => RuleKind::LinkMod,
        "LINK_EXECUTABLE" => RuleKind::LinkExecutable,
        _ => return None,
    })
}

/// Reads template parts (`<cxx/>`, `<tool which=.../>`, `<var name=.../>`,
/// text) until the matching end tag for the element we're already inside.
fn read_template(reader: &mut Reader<&[u8]>, closing: &[u8]) -> Result<CommandTemplate> {
    let mut parts = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) | Event::Start(e) => {
                let name = e.name();
                match name.as_ref() {
                    b"cxx" => parts.push(TemplatePart::Cxx),
                    b"tool" => {
                        let which = attr(&e, "which").unwrap_or_default();
                        parts.push(TemplatePart::Tool(which));
                    }
                    b"var" => {
                        let var_name = attr(&e, "name").unwrap_or_default();
                        if let Some(v) = CommandVar::from_name(&var_name) {
                            parts.push(TemplatePart::Var(v));
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(t) => {
                let text = t.unescape()?.into_owned();
                if !text.is_empty() {
                    parts.push(TemplatePart::Literal(text));
                }
            }
            Event::End(e) if e.name().as_ref() == closing => break,
            Event::Eof => bail!("unexpected end of descriptor inside <{}>", String::from_utf8_lossy(closing)),
            _ => {}
        }
        buf.clear();
    }
    Ok(CommandTemplate(parts))
}

pub fn parse_descriptor(xml: &str) -> Result<Descriptor> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut ident = None;
    let mut bmi = None;
    let mut include_dirs = None;
    let mut rules: BTreeMap<RuleKind, Vec<CommandTemplate>> = BTreeMap::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) | Event::Start(e) if e.name().as_ref() == b"ident" => {
                ident = Some(Ident {
                    compat: attr(&e, "compat").unwrap_or_default(),
                    exe: attr(&e, "exe").unwrap_or_default(),
                    name: attr(&e, "name").unwrap_or_default(),
                    guard: attr(&e, "guard").unwrap_or_default(),
                    version: attr(&e, "version").unwrap_or_default(),
                    find_tripple: attr(&e, "find-tripple").as_deref() == Some("true"),
                });
            }
            Event::Empty(e) | Event::Start(e) if e.name().as_ref() == b"bmi-cache" => {
                bmi = Some(BmiDecl {
                    dirname: attr(&e, "dirname").unwrap_or_default(),
                    ext: attr(&e, "ext").unwrap_or_default(),
                    kind: if attr(&e, "type").as_deref() == Some("side-effect") {
                        BmiKind::SideEffect
                    } else {
                        BmiKind::Direct
                    },
                    supports_partitions: attr(&e, "partitions").as_deref() != Some("false"),
                });
            }
            Event::Start(e) if e.name().as_ref() == b"include-dirs" => {
                let output = if attr(&e, "output").as_deref() == Some("stdout") {
                    OutputStream::Stdout
                } else {
                    OutputStream::Stderr
                };
                let start = attr(&e, "start").unwrap_or_default();
                let stop = attr(&e, "stop").unwrap_or_default();
                let command = read_template(&mut reader, b"include-dirs")?;
                include_dirs = Some(IncludeDirsRecipe { output, start, stop, command });
            }
            Event::Start(e) if e.name().as_ref() == b"rule" => {
                let id = attr(&e, "id").unwrap_or_default();
                let Some(kind) = rule_kind_from_id(&id) else {
                    skip_to_end(&mut reader, b"rule")?;
                    continue;
                };
                let commands = read_rule_commands(&mut reader)?;
                rules.insert(kind, commands);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(Descriptor {
        ident: ident.context("descriptor missing <ident>")?,
        bmi: bmi.context("descriptor missing <bmi-cache>")?,
        include_dirs: include_dirs.context("descriptor missing <include-dirs>")?,
        rules,
    })
}

fn read_rule_commands(reader: &mut Reader<&[u8]>) -> Result<Vec<CommandTemplate>> {
    let mut commands = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"command" => {
                commands.push(read_template(reader, b"command")?);
            }
            Event::End(e) if e.name().as_ref() == b"rule" => break,
            Event::Eof => return Err(anyhow!("unexpected end of descriptor inside <rule>")),
            _ => {}
        }
        buf.clear();
    }
    Ok(commands)
}

fn skip_to_end(reader: &mut Reader<&[u8]>, tag: &[u8]) -> Result<()> {
    let mut depth = 1;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == tag => depth += 1,
            Event::End(e) if e.name().as_ref() == tag => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Event::Eof => bail!("unexpected end of descriptor while skipping <{}>", String::from_utf8_lossy(tag)),
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<compiler>
        <ident compat="gcc" exe="c++" name="GCC" guard="defined(__GNUC__)" version="__GNUC__ __GNUC_MINOR__"/>
        <bmi-cache dirname="gcm.cache" ext=".gcm" type="direct" partitions="true"/>
        <include-dirs output="stderr" start="#include &lt;...&gt;" stop="End of search list.">
            <cxx/> -E -Wp,-v -xc++ -
        </include-dirs>
        <rules>
            <rule id="COMPILE">
                <command><cxx/> <var name="CXXFLAGS"/> -c <var name="INPUT"/> -o <var name="OUTPUT"/></command>
            </rule>
            <rule id="LINK_EXECUTABLE">
                <command><cxx/> <var name="INPUT"/> -o <var name="OUTPUT"/></command>
            </rule>
        </rules>
    </compiler>"#;

    #[test]
    fn parses_ident_and_bmi_cache() {
        let d = parse_descriptor(SAMPLE).unwrap();
        assert_eq!(d.ident.name, "GCC");
        assert_eq!(d.bmi.dirname, "gcm.cache");
        assert!(d.bmi.is_standalone());
    }

    #[test]
    fn parses_rule_commands() {
        let d = parse_descriptor(SAMPLE).unwrap();
        let compile = &d.rules[&RuleKind::Compile][0];
        let ctx = TemplateContext {
            cxx: "c++".into(),
            input: "a.cpp".into(),
            output: "a.o".into(),
            cxxflags: "-std=c++20".into(),
            ..Default::default()
        };
        assert_eq!(compile.render(&ctx), "c++ -std=c++20 -c a.cpp -o a.o");
    }

    #[test]
    fn unrecognized_rule_ids_are_skipped_without_failing() {
        let xml = SAMPLE.replace("LINK_EXECUTABLE", "LINK_WEIRD");
        let d = parse_descriptor(&xml).unwrap();
        assert!(!d.rules.contains_key(&RuleKind::LinkExecutable));
    }

    #[test]
    fn bmi_path_uses_dash_when_partitions_supported() {
        let d = parse_descriptor(SAMPLE).unwrap();
        assert_eq!(d.bmi.bmi_path("a.b", "part"), "gcm.cache/a.b-part.gcm");
        assert_eq!(d.bmi.bmi_path("a.b", ""), "gcm.cache/a.b.gcm");
    }
}
