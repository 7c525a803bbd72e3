//! # Stubgen
//!
//! Generates configurable C# test stubs from .NET type metadata.
//!
//! Every public class in a module becomes a `partial class` whose members
//! forward to hooks on a companion `Configuration` object, so a test can
//! script return values, side effects and event firing without subclassing
//! or a mocking framework. Interfaces, structs, enums and delegates are
//! re-declared so the stubs compile against them.
//!
//! ## Quick Start
//!
//! ```ignore
//! use stubgen::prelude::*;
//!
//! let catalog = parse_catalog_file(Path::new("Acme.Shop.xml"))?;
//! let report = StubWriter::new("stubs").write_all(&Generator::new(&catalog))?;
//! assert!(report.is_success());
//! ```
//!
//! ## Crate Organization
//!
//! - [`metadata`] - Type catalogue model, XML reader and validation
//! - [`codegen`] - Stub generation and file output

pub mod prelude;

/// Type metadata model and catalogue reader.
pub mod metadata {
    pub use stubgen_metadata::*;
}

/// C# stub generation.
pub mod codegen {
    pub use stubgen_codegen::*;
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn test_prelude_end_to_end() {
        let xml = r#"<catalog module="Acme.Mail.dll">
    <type name="IMailer" namespace="Acme.Mail" kind="interface">
        <method name="Send" returns="System.Boolean">
            <parameter name="to" type="System.String"/>
        </method>
    </type>
    <type name="SmtpMailer" namespace="Acme.Mail" kind="class">
        <interface type="Acme.Mail.IMailer"/>
        <method name="Send" returns="System.Boolean">
            <parameter name="to" type="System.String"/>
        </method>
        <event name="Sent" type="System.EventHandler"/>
    </type>
    <type name="Priority" namespace="Acme.Mail" kind="enum" underlying="System.Byte">
        <value name="Low">0</value>
        <value name="High">1</value>
    </type>
</catalog>"#;
        let catalog = parse_catalog(xml).unwrap();
        validate_catalog(&catalog).unwrap();
        let dir = TempDir::new().unwrap();

        let report = StubWriter::new(dir.path())
            .write_all(&Generator::new(&catalog))
            .unwrap();

        assert!(report.is_success());
        assert_eq!(report.written.len(), 3);
        let mailer = std::fs::read_to_string(dir.path().join("Acme/Mail/SmtpMailer.cs")).unwrap();
        assert!(mailer.contains("public partial class SmtpMailer : IMailer"));
        assert!(mailer.contains("public Func<System.String, System.Boolean>? Send_0 { get; set; }"));
        assert!(mailer.contains("public void RaiseSent(System.Object sender, System.EventArgs e)"));
        let priority = std::fs::read_to_string(dir.path().join("Acme/Mail/Priority.cs")).unwrap();
        assert!(priority.contains("public enum Priority : System.Byte"));
    }
}
