//! Oozie workflow XML serialization.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesText, Event};
use weft_graph::{ActionElement, ActionRecord, CompiledWorkflow, EmissionRecord};

use crate::TRACING_TARGET;
use crate::error::{OozieError, OozieResult};

/// Namespace of the `workflow-app` root element.
pub const WORKFLOW_NAMESPACE: &str = "uri:oozie:workflow:0.2";

/// File written inside each workflow's output directory.
const WORKFLOW_FILE: &str = "workflow.xml";

/// Layout of the timestamp in the autogenerated-file comment.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Returns the current local time formatted for the autogenerated comment.
///
/// Callers compiling a batch take one timestamp and share it across every
/// document of the run.
pub fn generation_timestamp() -> String {
    jiff::Zoned::now().strftime(TIMESTAMP_FORMAT).to_string()
}

/// Serializer for one workflow document.
#[derive(Debug, Clone, Copy)]
pub struct WorkflowXml<'a> {
    name: &'a str,
    records: &'a [EmissionRecord],
    timestamp: &'a str,
}

impl<'a> WorkflowXml<'a> {
    /// Creates a serializer over emission records.
    pub fn new(name: &'a str, records: &'a [EmissionRecord], timestamp: &'a str) -> Self {
        Self {
            name,
            records,
            timestamp,
        }
    }

    /// Creates a serializer for a compiled workflow.
    pub fn from_compiled(compiled: &'a CompiledWorkflow, timestamp: &'a str) -> Self {
        Self::new(compiled.name(), compiled.records(), timestamp)
    }

    /// Serializes the document into a string.
    pub fn render(&self) -> OozieResult<String> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer).map_err(OozieError::Serialize)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Writes the document to `<output_dir>/<name>/workflow.xml`.
    ///
    /// Missing directories are created and an existing file is overwritten.
    /// Returns the path of the written file.
    pub fn write_file(&self, output_dir: impl AsRef<Path>) -> OozieResult<PathBuf> {
        let directory = output_dir.as_ref().join(self.name);
        fs::create_dir_all(&directory).map_err(|source| OozieError::Io {
            path: directory.clone(),
            source,
        })?;

        let path = directory.join(WORKFLOW_FILE);
        let io_error = |source| OozieError::Io {
            path: path.clone(),
            source,
        };
        let file = File::create(&path).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer).map_err(io_error)?;
        writer.flush().map_err(io_error)?;

        tracing::info!(
            target: TRACING_TARGET,
            workflow = self.name,
            path = %path.display(),
            "wrote workflow XML"
        );

        Ok(path)
    }

    /// Writes the document to any byte sink.
    pub fn write_to<W: Write>(&self, sink: W) -> io::Result<()> {
        let mut writer = Writer::new_with_indent(sink, b' ', 2);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        let comment = format!(
            " {} workflow autogenerated by Weft on {} ",
            comment_safe(self.name),
            comment_safe(self.timestamp)
        );
        writer.write_event(Event::Comment(BytesText::from_escaped(comment)))?;

        writer
            .create_element("workflow-app")
            .with_attribute(("xmlns", WORKFLOW_NAMESPACE))
            .with_attribute(("name", self.name))
            .write_inner_content(|writer| -> io::Result<()> {
                for record in self.records {
                    write_record(writer, record)?;
                }
                Ok(())
            })?;

        writer.get_mut().write_all(b"\n")
    }
}

/// Collapses runs of `-` so the text cannot contain `--`, which XML
/// forbids inside comments.
fn comment_safe(text: &str) -> String {
    let mut safe = String::with_capacity(text.len());
    for c in text.chars() {
        if !(c == '-' && safe.ends_with('-')) {
            safe.push(c);
        }
    }
    safe
}

fn write_record<W: Write>(writer: &mut Writer<W>, record: &EmissionRecord) -> io::Result<()> {
    match record {
        EmissionRecord::Start { to } => {
            writer
                .create_element("start")
                .with_attribute(("to", to.as_str()))
                .write_empty()?;
        }
        EmissionRecord::Fork { name, paths } => {
            writer
                .create_element("fork")
                .with_attribute(("name", name.as_str()))
                .write_inner_content(|writer| -> io::Result<()> {
                    for path in paths {
                        writer
                            .create_element("path")
                            .with_attribute(("start", path.as_str()))
                            .write_empty()?;
                    }
                    Ok(())
                })?;
        }
        EmissionRecord::Join { name, to } => {
            writer
                .create_element("join")
                .with_attribute(("name", name.as_str()))
                .with_attribute(("to", to.as_str()))
                .write_empty()?;
        }
        EmissionRecord::Action(action) => write_action(writer, action)?,
        EmissionRecord::Kill { name, message } => {
            writer
                .create_element("kill")
                .with_attribute(("name", name.as_str()))
                .write_inner_content(|writer| -> io::Result<()> {
                    writer
                        .create_element("message")
                        .write_text_content(BytesText::new(message))?;
                    Ok(())
                })?;
        }
        EmissionRecord::End { name } => {
            writer
                .create_element("end")
                .with_attribute(("name", name.as_str()))
                .write_empty()?;
        }
    }
    Ok(())
}

fn write_action<W: Write>(writer: &mut Writer<W>, action: &ActionRecord) -> io::Result<()> {
    writer
        .create_element("action")
        .with_attribute(("name", action.name.as_str()))
        .write_inner_content(|writer| -> io::Result<()> {
            let mut body = writer.create_element(action.tag.as_str());
            if let Some(xmlns) = &action.xmlns {
                body = body.with_attribute(("xmlns", xmlns.as_str()));
            }
            body.write_inner_content(|writer| -> io::Result<()> {
                for element in &action.elements {
                    write_element(writer, element)?;
                }
                Ok(())
            })?;

            writer
                .create_element("ok")
                .with_attribute(("to", action.ok.as_str()))
                .write_empty()?;
            writer
                .create_element("error")
                .with_attribute(("to", action.error.as_str()))
                .write_empty()?;
            Ok(())
        })?;
    Ok(())
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &ActionElement) -> io::Result<()> {
    match element {
        ActionElement::Argument { name, values } => {
            for value in values {
                writer
                    .create_element(name.as_str())
                    .write_text_content(BytesText::new(value))?;
            }
        }
        ActionElement::Configuration(properties) => {
            writer
                .create_element("configuration")
                .write_inner_content(|writer| -> io::Result<()> {
                    for (name, value) in properties {
                        writer
                            .create_element("property")
                            .write_inner_content(|writer| -> io::Result<()> {
                                writer
                                    .create_element("name")
                                    .write_text_content(BytesText::new(name))?;
                                writer
                                    .create_element("value")
                                    .write_text_content(BytesText::new(value))?;
                                Ok(())
                            })?;
                    }
                    Ok(())
                })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use weft_core::config::{ActionType, Config};
    use weft_core::{Action, Workflow};
    use weft_graph::WorkflowCompiler;

    use super::*;

    const TIMESTAMP: &str = "2024-03-01 12:00:00";

    fn config() -> Config {
        let mut java = ActionType::new("java", "java");
        java.xmlns = Some("uri:oozie:java-action:0.1".into());
        java.default_args
            .insert("job-tracker".into(), vec!["$$tracker$$".into()]);
        java.properties
            .insert("mapred.job.queue.name".into(), "default".into());
        java.default_interpolations
            .insert("tracker".into(), "jt:8021".into());
        java.configuration_position = 1;

        Config {
            action_types: vec![java],
            kill_name: Some("kill".into()),
            kill_message: Some("$$name$$ failed <at> runtime".into()),
        }
    }

    fn render(workflow: &Workflow) -> String {
        let config = config();
        let compiled = WorkflowCompiler::new(&config).compile(workflow).unwrap();
        WorkflowXml::from_compiled(&compiled, TIMESTAMP)
            .render()
            .unwrap()
    }

    fn chain() -> Workflow {
        let a2 = Action::builder()
            .with_name("a2")
            .with_action_type("java")
            .with_dependency("a1")
            .with_positional_arg("main-class", ["com.example.Second"])
            .build()
            .unwrap();

        Workflow::new("nightly")
            .with_action(Action::new("a1", "java"))
            .with_action(a2)
    }

    fn position(document: &str, needle: &str) -> usize {
        document
            .find(needle)
            .unwrap_or_else(|| panic!("{needle} not found in:\n{document}"))
    }

    #[test]
    fn test_header() {
        let document = render(&chain());

        assert!(document.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(document.contains(
            "<!-- nightly workflow autogenerated by Weft on 2024-03-01 12:00:00 -->"
        ));
        assert!(document.contains(
            "<workflow-app xmlns=\"uri:oozie:workflow:0.2\" name=\"nightly\">"
        ));
        assert!(position(&document, "<!--") < position(&document, "<workflow-app"));
    }

    #[test]
    fn test_comment_never_contains_double_hyphen() {
        let records = vec![EmissionRecord::End { name: "end".into() }];
        let document = WorkflowXml::new("etl--nightly---", &records, TIMESTAMP)
            .render()
            .unwrap();

        let open = position(&document, "<!--") + "<!--".len();
        let close = open + position(&document[open..], "-->");
        let comment = &document[open..close];

        assert_eq!(
            comment,
            " etl-nightly- workflow autogenerated by Weft on 2024-03-01 12:00:00 "
        );
        assert!(document.contains("name=\"etl--nightly---\""));
    }

    #[test]
    fn test_element_order() {
        let document = render(&chain());

        let start = position(&document, "<start to=\"a1\"/>");
        let a1 = position(&document, "<action name=\"a1\">");
        let a2 = position(&document, "<action name=\"a2\">");
        let kill = position(&document, "<kill name=\"kill\">");
        let end = position(&document, "<end name=\"end\"/>");

        assert!(start < a1 && a1 < a2 && a2 < kill && kill < end);
        assert!(document.contains("<ok to=\"a2\"/>"));
        assert!(document.contains("<error to=\"kill\"/>"));
    }

    #[test]
    fn test_action_body() {
        let document = render(&chain());

        assert!(document.contains("<java xmlns=\"uri:oozie:java-action:0.1\">"));
        assert!(document.contains("<job-tracker>jt:8021</job-tracker>"));
        assert!(document.contains("<main-class>com.example.Second</main-class>"));
        assert!(document.contains("<name>mapred.job.queue.name</name>"));
        assert!(document.contains("<value>default</value>"));

        let a2 = position(&document, "<action name=\"a2\">");
        let body = &document[a2..];
        let tracker = position(body, "<job-tracker>");
        let configuration = position(body, "<configuration>");
        let main_class = position(body, "<main-class>");
        assert!(tracker < configuration && configuration < main_class);
    }

    #[test]
    fn test_kill_message_is_escaped() {
        let document = render(&chain());
        assert!(document.contains("<message>nightly failed &lt;at&gt; runtime</message>"));
    }

    #[test]
    fn test_fork_and_join() {
        let workflow = Workflow::new("parallel")
            .with_action(Action::new("a1", "java"))
            .with_action(Action::new("a2", "java"));
        let document = render(&workflow);

        assert!(document.contains("<start to=\"fork-0\"/>"));
        assert!(document.contains("<fork name=\"fork-0\">"));
        assert!(document.contains("<path start=\"a1\"/>"));
        assert!(document.contains("<path start=\"a2\"/>"));
        assert!(document.contains("<join name=\"join-0\" to=\"end\"/>"));
        assert!(document.contains("<error to=\"join-0\"/>"));
    }

    #[test]
    fn test_records_without_compilation() {
        let mut properties = IndexMap::new();
        properties.insert("k".to_owned(), "v".to_owned());
        let records = vec![
            EmissionRecord::Start { to: "a".into() },
            EmissionRecord::Action(ActionRecord {
                name: "a".into(),
                tag: "shell".into(),
                xmlns: None,
                elements: vec![
                    ActionElement::Argument {
                        name: "argument".into(),
                        values: vec!["x".into(), "y".into()],
                    },
                    ActionElement::Configuration(properties),
                ],
                ok: "end".into(),
                error: "end".into(),
            }),
            EmissionRecord::End { name: "end".into() },
        ];

        let document = WorkflowXml::new("manual", &records, TIMESTAMP)
            .render()
            .unwrap();

        assert!(document.contains("<shell>"));
        assert!(document.contains("<argument>x</argument>"));
        assert!(document.contains("<argument>y</argument>"));
        assert!(document.contains("<name>k</name>"));
        assert!(!document.contains("<kill"));
    }

    #[test]
    fn test_write_file() {
        let output = tempfile::tempdir().unwrap();
        let config = config();
        let compiled = WorkflowCompiler::new(&config).compile(&chain()).unwrap();

        let path = WorkflowXml::from_compiled(&compiled, TIMESTAMP)
            .write_file(output.path())
            .unwrap();

        assert_eq!(path, output.path().join("nightly").join("workflow.xml"));
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("<action name=\"a1\">"));
    }

    #[test]
    fn test_generation_timestamp_layout() {
        let timestamp = generation_timestamp();
        assert_eq!(timestamp.len(), "2024-03-01 12:00:00".len());
        assert_eq!(&timestamp[4..5], "-");
        assert_eq!(&timestamp[10..11], " ");
    }
}
