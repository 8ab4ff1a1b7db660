mod pass_props;
