mod newsletter;
mod send_newsletter;
mod subscription;
