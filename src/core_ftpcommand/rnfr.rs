use crate::core_error::FtpResult;
use crate::core_network::Reply;
use crate::session::Session;
use log::info;

impl Session {
    /// Renames a file or directory with RNFR followed by RNTO.
    ///
    /// RNFR must be answered with a 3xx reply; anything else is returned
    /// as-is and RNTO is not sent.
    pub async fn rename(&mut self, from: &str, to: &str) -> FtpResult<Reply> {
        let reply = self.send("RNFR", Some(from)).await?;
        if !reply.is_intermediate() {
            info!("RNFR {} not accepted: {}", from, reply.text().trim_end());
            return Ok(reply);
        }
        self.send("RNTO", Some(to)).await
    }
}
