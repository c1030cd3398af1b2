//! output layout
//!
//! Fragments are [hcl_edit] structures. hcl-edit keeps whitespace and comments in the [Decor] of each node and
//! writes them back verbatim, so this module only decides the layout: indentation, blank lines between
//! sections, `#` comment lines and the `=` alignment of consecutive attributes the way `terraform fmt` does it.
//! Encoding of literals (escapes, template markers, quoted labels and keys) is left to hcl-edit.
//!
//! Whitespace in front of a structure lives in its decor prefix. Comments and blank lines written after the last
//! structure of a body end up in the body's decor suffix, right before the closing brace.
use hcl_edit::expr::{
    Array, Expression, Object, ObjectKey, ObjectValue, ObjectValueTerminator, Traversal,
    TraversalOperator,
};
use hcl_edit::structure::{Attribute, Block, BlockLabel, Body, Structure};
use hcl_edit::{Decorate, Decorated, Ident};

fn pad(indent: usize) -> String {
    " ".repeat(indent)
}

pub fn string_list<S: AsRef<str>>(values: impl IntoIterator<Item = S>) -> Expression {
    let array: Array = values
        .into_iter()
        .map(|value| Expression::from(value.as_ref()))
        .collect();
    Expression::Array(array)
}

/// Reference an attribute of another resource: `<resource_type>.<symbol>.<attribute>`
///
/// `resource_type` and `attribute` are names we control and must be valid identifiers.
pub fn reference(resource_type: &str, symbol: &hcl::Identifier, attribute: &str) -> Expression {
    let get_attr = |name: Ident| Decorated::new(TraversalOperator::GetAttr(Decorated::new(name)));

    Traversal::new(
        Expression::Variable(Decorated::new(Ident::new(resource_type))),
        vec![
            get_attr(Ident::from(symbol.clone())),
            get_attr(Ident::new(attribute)),
        ],
    )
    .into()
}

/// Object keys stay bare when they are valid identifiers, otherwise they are quoted
pub fn object_key(key: &str) -> ObjectKey {
    match Ident::try_new(key) {
        Ok(ident) => ObjectKey::from(ident),
        Err(_) => ObjectKey::from(Expression::from(key)),
    }
}

fn key_width(key: &ObjectKey) -> usize {
    match key {
        ObjectKey::Ident(ident) => ident.as_str().chars().count(),
        ObjectKey::Expression(expression) => expression.to_string().chars().count(),
    }
}

/// `{ key = value ... }` with one aligned entry per line, laid out as the value of an attribute at `indent`
pub fn object(entries: impl IntoIterator<Item = (ObjectKey, Expression)>, indent: usize) -> Expression {
    let entries: Vec<(ObjectKey, Expression)> = entries.into_iter().collect();
    let mut object = Object::new();
    if entries.is_empty() {
        return Expression::Object(object);
    }

    let width = entries
        .iter()
        .map(|(key, _)| key_width(key))
        .max()
        .unwrap_or_default();

    for (mut key, value) in entries {
        let padding = width - key_width(&key) + 1;
        key.decorate((format!("\n{}", pad(indent + 2)), " ".repeat(padding)));

        let mut value = ObjectValue::new(value);
        value.set_terminator(ObjectValueTerminator::None);
        object.insert(key, value);
    }
    object.set_trailing(format!("\n{}", pad(indent)));

    Expression::Object(object)
}

/// Ordered statements of one body at a fixed indent
#[derive(Debug, Clone)]
pub struct BodyWriter {
    indent: usize,
    structures: Vec<Structure>,
    /// start of the run of consecutive attributes that is still open
    run_start: Option<usize>,
    /// comments and blank lines not yet attached to a structure
    pending: String,
}

impl BodyWriter {
    pub fn new(indent: usize) -> Self {
        BodyWriter {
            indent,
            structures: vec![],
            run_start: None,
            pending: String::new(),
        }
    }

    pub fn attribute(&mut self, key: &str, value: impl Into<Expression>) -> &mut Self {
        self.structure(Attribute::new(Ident::new(key), value))
    }

    pub fn structure(&mut self, structure: impl Into<Structure>) -> &mut Self {
        let mut structure = structure.into();

        let joins_run =
            structure.is_attribute() && self.pending.is_empty() && self.run_start.is_some();
        if !joins_run {
            self.align_run();
            self.run_start = structure.is_attribute().then_some(self.structures.len());
        }

        let prefix = format!("{}{}", std::mem::take(&mut self.pending), pad(self.indent));
        structure.decor_mut().set_prefix(prefix);
        self.structures.push(structure);
        self
    }

    /// A `#` comment, one per line of `text`
    pub fn comment(&mut self, text: &str) -> &mut Self {
        let pad = pad(self.indent);
        if text.is_empty() {
            self.pending.push_str(&format!("{pad}#\n"));
        }
        for line in text.lines() {
            match line.is_empty() {
                true => self.pending.push_str(&format!("{pad}#\n")),
                false => self.pending.push_str(&format!("{pad}# {line}\n")),
            }
        }
        self
    }

    /// Start a new section: a blank line unless this is the first statement
    pub fn section(&mut self) -> &mut Self {
        if !self.is_empty() {
            self.pending.push('\n');
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty() && self.pending.is_empty()
    }

    fn align_run(&mut self) {
        let Some(start) = self.run_start.take() else {
            return;
        };
        let run = &mut self.structures[start..];

        let width = run
            .iter()
            .filter_map(Structure::as_attribute)
            .map(|attribute| attribute.key.as_str().chars().count())
            .max()
            .unwrap_or_default();

        for attribute in run.iter_mut().filter_map(Structure::as_attribute_mut) {
            let padding = width - attribute.key.as_str().chars().count() + 1;
            attribute.key.decor_mut().set_suffix(" ".repeat(padding));
        }
    }

    /// The body of a block whose closing brace sits at `closing_indent`
    pub fn into_body(mut self, closing_indent: usize) -> Body {
        self.align_run();
        let mut body: Body = self.structures.into_iter().collect();
        body.decorate(("", format!("{}{}", self.pending, pad(closing_indent))));
        body
    }

    /// Render as a top-level fragment without a trailing newline
    pub fn render(mut self) -> String {
        self.align_run();
        let trailing = self.pending.trim_end_matches('\n').to_string();
        if self.structures.is_empty() {
            return trailing;
        }

        let mut body: Body = self.structures.into_iter().collect();
        body.set_prefer_omit_trailing_newline(true);
        if !trailing.is_empty() {
            body.decorate(("", format!("\n{trailing}")));
        }
        body.to_string()
    }
}

/// `ident "label" ... { body }` whose first line sits at `indent`
#[derive(Debug, Clone)]
pub struct BlockWriter {
    ident: Ident,
    labels: Vec<String>,
    indent: usize,
    pub body: BodyWriter,
}

impl BlockWriter {
    /// Block without labels, e.g. `root_block_device { ... }`
    pub fn nested(ident: &str, indent: usize) -> Self {
        BlockWriter {
            ident: Ident::new(ident),
            labels: vec![],
            indent,
            body: BodyWriter::new(indent + 2),
        }
    }

    /// Top-level `resource "<resource_type>" "<symbol>" { ... }`
    pub fn resource(resource_type: &str, symbol: &hcl::Identifier) -> Self {
        BlockWriter {
            ident: Ident::new("resource"),
            labels: vec![resource_type.to_string(), symbol.to_string()],
            indent: 0,
            body: BodyWriter::new(2),
        }
    }

    pub fn finish(self) -> Block {
        let mut block = Block::new(self.ident);
        block.labels = self.labels.into_iter().map(BlockLabel::from).collect();

        if self.body.is_empty() {
            block.body.set_prefer_oneline(true);
        } else {
            block.body = self.body.into_body(self.indent);
        }
        block
    }

    pub fn render(self) -> String {
        let indent = self.indent;
        render_at(self.finish(), indent)
    }
}

/// Render one structure at `indent`, without a trailing newline
pub fn render_at(structure: impl Into<Structure>, indent: usize) -> String {
    let mut body = BodyWriter::new(indent);
    body.structure(structure);
    body.render()
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn string(value: &str) -> String {
        Expression::from(value).to_string()
    }

    #[test]
    fn string_literals() {
        assert_eq!(string("plain"), r#""plain""#);
        assert_eq!(string(r#"say "hi""#), r#""say \"hi\"""#);
        assert_eq!(string("C:\\dir"), r#""C:\\dir""#);
        assert_eq!(string("a\nb\tc"), r#""a\nb\tc""#);
        assert_eq!(string("${var} %{if} $5"), r#""$${var} %%{if} $5""#);
    }

    #[test]
    fn control_characters_are_escaped() {
        assert_eq!(string("a\u{1}b\u{7f}c"), r#""a\u0001b\u007Fc""#);

        let mut block = BlockWriter::nested("example", 0);
        block.body.attribute("value", "a\u{1}b");
        let rendered = block.render();
        assert!(!rendered.contains('\u{1}'));
        hcl_edit::parser::parse_body(&rendered).expect("escaped output parses");
    }

    #[test]
    fn expressions() {
        assert_eq!(string_list(["sg-1", "sg-2"]).to_string(), r#"["sg-1", "sg-2"]"#);
        assert_eq!(string_list(Vec::<String>::new()).to_string(), "[]");
        assert_eq!(Expression::from(8u64).to_string(), "8");
        assert_eq!(Expression::from(false).to_string(), "false");
        assert_eq!(
            reference("aws_instance", &hcl::Identifier::unchecked("web"), "id").to_string(),
            "aws_instance.web.id"
        );
    }

    #[test]
    fn object_keys() {
        let entries = [
            (object_key("Name"), Expression::from("a")),
            (object_key("cost-center"), Expression::from("b")),
            (object_key("aws:autoscaling:groupName"), Expression::from("c")),
            (object_key("two words"), Expression::from("d")),
        ];

        let expected = r#"{
  Name                        = "a"
  cost-center                 = "b"
  "aws:autoscaling:groupName" = "c"
  "two words"                 = "d"
}"#;
        assert_eq!(object(entries, 0).to_string(), expected);
    }

    #[test]
    fn alignment_is_per_run() {
        let mut block = BlockWriter::nested("example", 2);
        block
            .body
            .attribute("a", "1")
            .attribute("longer_key", true)
            .section()
            .attribute("b", 2u64)
            .comment("note")
            .attribute("c", false);

        let expected = r#"  example {
    a          = "1"
    longer_key = true

    b = 2
    # note
    c = false
  }"#;
        assert_eq!(block.render(), expected);
    }

    #[test]
    fn empty_block_and_object() {
        assert_eq!(BlockWriter::nested("lifecycle", 0).render(), "lifecycle {}");

        let tags = Attribute::new(Ident::new("tags"), object(vec![], 2));
        assert_eq!(render_at(tags, 2), "  tags = {}");
    }

    #[test]
    fn resource_labels() {
        let block = BlockWriter::resource("aws_eip", &hcl::Identifier::unchecked("web_eip"));
        assert_eq!(block.render(), r#"resource "aws_eip" "web_eip" {}"#);
    }

    #[test]
    fn nested_blocks_keep_their_indent() {
        let mut inner = BlockWriter::nested("inner", 2);
        inner.body.attribute("y", 2u64);

        let mut outer = BlockWriter::nested("outer", 0);
        outer.body.attribute("x", 1u64).section().structure(inner.finish());

        assert_eq!(outer.render(), "outer {\n  x = 1\n\n  inner {\n    y = 2\n  }\n}");
    }

    #[test]
    fn trailing_comments_stay_inside_the_block() {
        let mut block = BlockWriter::nested("lifecycle", 2);
        block.body.comment("keep").comment("ignore_changes = [ami]");

        assert_eq!(
            block.render(),
            "  lifecycle {\n    # keep\n    # ignore_changes = [ami]\n  }"
        );
    }

    #[test]
    fn empty_comment_line() {
        let mut body = BodyWriter::new(0);
        body.comment("first\n\nthird").attribute("x", 1u64);
        assert_eq!(body.render(), "# first\n#\n# third\nx = 1");
    }
}
