//! # ec2tf - terraform configuration from an ec2 instance
//!
//! Turns the description of a running instance into a terraform document that recreates it.
//!
//! ## Introduction for developers
//!
//! Read this to understand how `ec2tf` works internally.
//!
//! ### Input
//!
//! Fetching is not our business. Something else (an API client, a fixture file, the `--input` of the CLI) builds
//! a [description::ResourceDescription] once and hands it over. The description is plain data: every field the
//! upstream API may leave out is an [Option] or an empty collection, and it is never modified while generating.
//!
//! ### Emitters
//!
//! Each part of the document has an emitter that builds one fragment:
//!
//! - [instance::emit_primary] renders the `aws_instance` resource. Its nested blocks (storage devices, credit,
//!   metadata, enclave and capacity reservation options) come from [sub_blocks].
//! - [satellites] renders elastic ips and secondary network interfaces as standalone resources together with
//!   their association/attachment resources.
//! - [tags::tags_attribute] and [identifier::sanitize] are used by all of the above.
//!
//! Emitters gate every statement on presence in the description. The only invented values are the storage
//! defaults (`gp2`, size `8`) and the fixed advisory comments.
//!
//! Fragments are [hcl_edit] structures laid out by the writers in [syntax]. hcl-edit encodes the literals; the
//! writers put indentation, comments and the `=` alignment of consecutive attributes into the decor:
//!
//! ```hcl
//! resource "aws_instance" "web" {
//!   ami           = "ami-0abcdef1234567890"
//!   instance_type = "t3.micro"
//!
//!   root_block_device {
//!     volume_type           = "gp3"
//!     volume_size           = 20
//!     delete_on_termination = true
//!   }
//! }
//! ```
//!
//! ### Symbols
//!
//! Block labels and references are derived from the `Name` tag (or the instance id) via
//! [identifier::sanitize]. Satellites append a suffix to the instance symbol: `web_eip`, `web_eip_1`,
//! `web_eni_1`, ...
//!
//! ### Determinism
//!
//! Generating twice from the same description yields the same bytes (given the same timestamp). Tags are always
//! emitted by ascending key and security groups are held in ordered sets; nothing depends on the order the API
//! happened to return.
//!
//! ### Output
//!
//! [document::Generator] joins header, instance, satellites and the closing recommendations with one blank line
//! between sections. [sink::Sink] writes the result to stdout or atomically to a file.
//!
pub mod description;
pub mod document;
pub mod export;
pub mod identifier;
pub mod instance;
pub mod satellites;
pub mod sink;
pub mod sub_blocks;
pub mod syntax;
pub mod tags;
