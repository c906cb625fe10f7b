use crate::core_error::{FtpError, FtpResult};
use crate::core_network::Reply;
use crate::session::{Representation, Session};
use log::debug;

impl Session {
    /// Handles the TYPE command typed by the user.
    ///
    /// Sends `TYPE <arg>` verbatim and, when the server accepts it, updates the
    /// session's representation flag: `I` means BINARY, anything else ASCII.
    ///
    /// # Arguments
    ///
    /// * `type_code` - The representation type requested, `A` or `I`.
    ///
    /// # Returns
    ///
    /// The server reply, `MissingType` when no type was given, or
    /// `UnsupportedType` when the server refused it.
    pub async fn set_type(&mut self, type_code: Option<&str>) -> FtpResult<Reply> {
        let type_code = match type_code {
            Some(code) if !code.trim().is_empty() => code.trim(),
            _ => return Err(FtpError::MissingType),
        };

        let reply = self.send("TYPE", Some(type_code)).await?;
        if !reply.is_success() {
            return Err(FtpError::UnsupportedType(type_code.to_string()));
        }

        let representation = if type_code.eq_ignore_ascii_case("I") {
            Representation::Binary
        } else {
            Representation::Ascii
        };
        self.set_representation(representation);
        debug!("Representation type is now {:?}", representation);
        Ok(reply)
    }

    /// Switches to `representation` unless the session already uses it.
    pub(crate) async fn switch_to(&mut self, representation: Representation) -> FtpResult<()> {
        if self.representation() == representation {
            return Ok(());
        }
        self.set_type(Some(representation.type_code())).await?;
        Ok(())
    }
}
